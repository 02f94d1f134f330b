use serde::{Deserialize, Serialize};

/// Perceptual colormaps used for heatmaps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Inferno,
    Magma,
    Viridis,
    Greyscale,
}

// Nine evenly spaced stops sampled from the matplotlib tables.
const INFERNO: [[u8; 3]; 9] = [
    [0, 0, 4],
    [31, 12, 72],
    [85, 15, 109],
    [136, 34, 106],
    [186, 54, 85],
    [227, 89, 51],
    [249, 140, 10],
    [249, 201, 50],
    [252, 255, 164],
];

const MAGMA: [[u8; 3]; 9] = [
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

const GREYSCALE: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

impl Colormap {
    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            Self::Inferno => &INFERNO,
            Self::Magma => &MAGMA,
            Self::Viridis => &VIRIDIS,
            Self::Greyscale => &GREYSCALE,
        }
    }

    /// Map `t` ∈ [0, 1] to RGB by linear interpolation between stops.
    /// Out-of-range and NaN inputs are clamped.
    ///
    /// # Example
    /// ```
    /// use ms_core::color::Colormap;
    /// assert_eq!(Colormap::Greyscale.map(0.0), [0, 0, 0]);
    /// assert_eq!(Colormap::Greyscale.map(1.0), [255, 255, 255]);
    /// assert_eq!(Colormap::Inferno.map(2.0), [252, 255, 164]);
    /// ```
    #[must_use]
    pub fn map(self, t: f32) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f32;
        let lo = (pos.floor() as usize).min(stops.len() - 1);
        let hi = (lo + 1).min(stops.len() - 1);
        let frac = pos - lo as f32;

        let mut out = [0u8; 3];
        for (c, slot) in out.iter_mut().enumerate() {
            let a = f32::from(stops[lo][c]);
            let b = f32::from(stops[hi][c]);
            *slot = (a + (b - a) * frac).round() as u8;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inferno_is_monotonic_in_brightness() {
        let luma = |c: [u8; 3]| {
            u32::from(c[0]) * 2126 + u32::from(c[1]) * 7152 + u32::from(c[2]) * 722
        };
        let mut prev = 0;
        for i in 0..=32 {
            let c = Colormap::Inferno.map(i as f32 / 32.0);
            let l = luma(c);
            assert!(l >= prev, "luminance dropped at step {i}");
            prev = l;
        }
    }

    #[test]
    fn nan_maps_to_low_end() {
        assert_eq!(Colormap::Viridis.map(f32::NAN), [68, 1, 84]);
    }
}

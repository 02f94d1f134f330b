//! Structural similarity index (Wang et al. 2004) on 8-bit grayscale frames.
//!
//! Uniform `win_size × win_size` window, sample covariance, mean taken over
//! the interior where the window fits entirely. Window sums are accumulated
//! as exact integers with a sliding column buffer, so memory stays
//! `O(width)` and identical inputs score exactly 1.

use ms_core::config::SimilarityConfig;
use ms_core::frame::GrayFrame;

use crate::error::SimilarityError;

/// Dynamic range of 8-bit intensities.
const DATA_RANGE: f64 = 255.0;

/// Running window sums for one column.
#[derive(Clone, Copy, Default)]
struct Sums {
    x: u64,
    y: u64,
    xx: u64,
    yy: u64,
    xy: u64,
}

impl Sums {
    #[inline]
    fn add(&mut self, a: u8, b: u8) {
        let (a, b) = (u64::from(a), u64::from(b));
        self.x += a;
        self.y += b;
        self.xx += a * a;
        self.yy += b * b;
        self.xy += a * b;
    }

    #[inline]
    fn sub(&mut self, a: u8, b: u8) {
        let (a, b) = (u64::from(a), u64::from(b));
        self.x -= a;
        self.y -= b;
        self.xx -= a * a;
        self.yy -= b * b;
        self.xy -= a * b;
    }

    #[inline]
    fn add_sums(&mut self, o: &Self) {
        self.x += o.x;
        self.y += o.y;
        self.xx += o.xx;
        self.yy += o.yy;
        self.xy += o.xy;
    }

    #[inline]
    fn sub_sums(&mut self, o: &Self) {
        self.x -= o.x;
        self.y -= o.y;
        self.xx -= o.xx;
        self.yy -= o.yy;
        self.xy -= o.xy;
    }
}

/// Mean SSIM between two equally shaped frames, in `[-1, 1]`.
///
/// # Errors
/// [`SimilarityError::ShapeMismatch`] if shapes differ,
/// [`SimilarityError::TooSmall`] if either side is shorter than the window.
///
/// # Example
/// ```
/// use ms_core::config::SimilarityConfig;
/// use ms_core::frame::GrayFrame;
/// use ms_image::ssim::structural_similarity;
///
/// let data: Vec<u8> = (0..400).map(|i| (i * 7 % 256) as u8).collect();
/// let a = GrayFrame::from_raw(20, 20, data).unwrap();
/// let score = structural_similarity(&a, &a, &SimilarityConfig::default()).unwrap();
/// assert_eq!(score, 1.0);
/// ```
pub fn structural_similarity(
    a: &GrayFrame,
    b: &GrayFrame,
    config: &SimilarityConfig,
) -> Result<f64, SimilarityError> {
    if a.shape() != b.shape() {
        return Err(SimilarityError::ShapeMismatch {
            a_width: a.width,
            a_height: a.height,
            b_width: b.width,
            b_height: b.height,
        });
    }
    let win = config.win_size;
    let (w, h) = (a.width as usize, a.height as usize);
    if w < win || h < win {
        return Err(SimilarityError::TooSmall {
            width: a.width,
            height: a.height,
            win_size: win,
        });
    }

    let np = (win * win) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (config.k1 * DATA_RANGE).powi(2);
    let c2 = (config.k2 * DATA_RANGE).powi(2);

    let at = |x: usize, y: usize| (a.data[y * w + x], b.data[y * w + x]);

    // Vertical sums of the first `win` rows, per column.
    let mut columns = vec![Sums::default(); w];
    for y in 0..win {
        for (x, col) in columns.iter_mut().enumerate() {
            let (p, q) = at(x, y);
            col.add(p, q);
        }
    }

    let mut total = 0.0f64;
    let mut count = 0usize;
    for top in 0..=(h - win) {
        if top > 0 {
            let (leaving, entering) = (top - 1, top + win - 1);
            for (x, col) in columns.iter_mut().enumerate() {
                let (p, q) = at(x, leaving);
                col.sub(p, q);
                let (p, q) = at(x, entering);
                col.add(p, q);
            }
        }

        let mut window = Sums::default();
        for col in &columns[..win] {
            window.add_sums(col);
        }
        for left in 0..=(w - win) {
            if left > 0 {
                window.sub_sums(&columns[left - 1]);
                window.add_sums(&columns[left + win - 1]);
            }

            let ux = window.x as f64 / np;
            let uy = window.y as f64 / np;
            let uxx = window.xx as f64 / np;
            let uyy = window.yy as f64 / np;
            let uxy = window.xy as f64 / np;
            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let num = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let den = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += num / den;
            count += 1;
        }
    }

    Ok(total / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> GrayFrame {
        let data = (0..h).flat_map(|y| (0..w).map(move |x| (x, y))).map(|(x, y)| f(x, y)).collect();
        GrayFrame { data, width: w, height: h }
    }

    #[test]
    fn self_similarity_is_exactly_one() -> Result<(), SimilarityError> {
        let a = frame(64, 48, |x, y| ((x * 13 + y * 7) % 256) as u8);
        assert_eq!(structural_similarity(&a, &a, &SimilarityConfig::default())?, 1.0);
        Ok(())
    }

    #[test]
    fn inverted_image_scores_low() -> Result<(), SimilarityError> {
        let a = frame(32, 32, |x, y| ((x * 8) ^ (y * 5)) as u8);
        let b = GrayFrame {
            data: a.data.iter().map(|v| 255 - v).collect(),
            ..a.clone()
        };
        let score = structural_similarity(&a, &b, &SimilarityConfig::default())?;
        assert!(score < 0.0, "score {score}");
        assert!(score >= -1.0);
        Ok(())
    }

    #[test]
    fn mild_noise_scores_between() -> Result<(), SimilarityError> {
        let a = frame(40, 40, |x, _| (x * 6) as u8);
        let b = frame(40, 40, |x, y| ((x * 6) as u8).saturating_add(((x + y) % 3 * 10) as u8));
        let score = structural_similarity(&a, &b, &SimilarityConfig::default())?;
        assert!(score > 0.0 && score < 1.0, "score {score}");
        Ok(())
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let a = GrayFrame::new(10, 10);
        let b = GrayFrame::new(10, 11);
        assert!(matches!(
            structural_similarity(&a, &b, &SimilarityConfig::default()),
            Err(SimilarityError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn smaller_than_window_is_rejected() {
        let a = GrayFrame::new(6, 20);
        assert!(matches!(
            structural_similarity(&a, &a, &SimilarityConfig::default()),
            Err(SimilarityError::TooSmall { .. })
        ));
    }

    #[test]
    fn flat_images_of_same_level_are_identical() -> Result<(), SimilarityError> {
        let a = frame(9, 9, |_, _| 42);
        assert_eq!(structural_similarity(&a, &a, &SimilarityConfig::default())?, 1.0);
        Ok(())
    }
}

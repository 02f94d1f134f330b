use crate::error::CoreError;

/// Mono audio decoded from a file. Immutable once loaded.
///
/// # Example
/// ```
/// use ms_core::frame::Waveform;
/// let wave = Waveform::new(vec![0.0; 22050], 22050);
/// assert!((wave.duration_secs() - 1.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap decoded mono samples at their native sample rate.
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Mono samples, nominally in [-1, 1].
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Native sample rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the decoder produced no samples at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds. Zero for a zero sample rate.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Axis metadata carried alongside a spectrogram, used for labelling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectrogramAxes {
    /// Sample rate of the source waveform.
    pub sample_rate: u32,
    /// Samples between consecutive frames.
    pub hop_length: usize,
    /// Lowest frequency covered by the mel bank, in Hz.
    pub fmin: f32,
    /// Highest frequency covered by the mel bank, in Hz.
    pub fmax: f32,
}

/// Grille [bin de fréquence, frame] de valeurs de puissance (ou de dB).
///
/// Stockage row-major : une ligne par bin mel, une colonne par frame.
///
/// # Example
/// ```
/// use ms_core::frame::{SpectrogramAxes, SpectrogramMatrix};
/// let axes = SpectrogramAxes { sample_rate: 22050, hop_length: 512, fmin: 0.0, fmax: 11025.0 };
/// let mut m = SpectrogramMatrix::new(4, 3, axes);
/// m.set(2, 1, 5.0);
/// assert_eq!(m.get(2, 1), 5.0);
/// assert_eq!(m.max(), 5.0);
/// ```
#[derive(Clone, Debug)]
pub struct SpectrogramMatrix {
    data: Vec<f32>,
    n_bins: usize,
    n_frames: usize,
    axes: SpectrogramAxes,
}

impl SpectrogramMatrix {
    /// Zero-filled matrix of `n_bins` rows by `n_frames` columns.
    #[must_use]
    pub fn new(n_bins: usize, n_frames: usize, axes: SpectrogramAxes) -> Self {
        Self {
            data: vec![0.0; n_bins * n_frames],
            n_bins,
            n_frames,
            axes,
        }
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    #[must_use]
    pub fn axes(&self) -> SpectrogramAxes {
        self.axes
    }

    #[inline]
    #[must_use]
    pub fn get(&self, bin: usize, frame: usize) -> f32 {
        debug_assert!(bin < self.n_bins && frame < self.n_frames);
        self.data[bin * self.n_frames + frame]
    }

    #[inline]
    pub fn set(&mut self, bin: usize, frame: usize, value: f32) {
        debug_assert!(bin < self.n_bins && frame < self.n_frames);
        self.data[bin * self.n_frames + frame] = value;
    }

    /// Flat row-major view.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Largest value, or `f32::NEG_INFINITY` for an empty matrix.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Smallest value, or `f32::INFINITY` for an empty matrix.
    #[must_use]
    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Time spanned by the frames, in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.axes.sample_rate == 0 {
            return 0.0;
        }
        (self.n_frames * self.axes.hop_length) as f64 / f64::from(self.axes.sample_rate)
    }
}

/// Image mono-canal 8 bits, row-major.
///
/// # Example
/// ```
/// use ms_core::frame::GrayFrame;
/// let frame = GrayFrame::new(10, 5);
/// assert_eq!(frame.data.len(), 50);
/// assert_eq!(frame.shape(), (10, 5));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    /// Intensities, row-major, one byte per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl GrayFrame {
    /// Black frame of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap an existing buffer.
    ///
    /// # Errors
    /// Returns an error if `data.len() != width * height`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize {
            return Err(CoreError::BufferLength {
                len: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// `(width, height)`.
    #[must_use]
    pub fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.width as usize + x as usize]
    }
}

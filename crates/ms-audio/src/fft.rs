use realfft::RealFftPlanner;

/// FFT pipeline: windowed real FFT producing power spectra.
///
/// Pre-allocates the FFT plan and scratch buffers so the STFT loop does not
/// allocate per frame.
///
/// # Example
/// ```
/// use ms_audio::fft::FftPipeline;
/// let fft = FftPipeline::new(2048);
/// assert_eq!(fft.n_bins(), 1025);
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<realfft::num_complex::Complex<f32>>,
    scratch: Vec<realfft::num_complex::Complex<f32>>,
    plan: std::sync::Arc<dyn realfft::RealToComplex<f32>>,
    /// Periodic Hann window coefficients.
    window: Vec<f32>,
}

impl FftPipeline {
    /// Create a new FFT pipeline with the given window size.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        Self {
            fft_size: size,
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window: hann_periodic(size),
        }
    }

    /// Window `frame` (zero-padded or truncated to the FFT size) and write
    /// `|X[k]|²` for each of the `N/2 + 1` bins into `power`.
    ///
    /// # Example
    /// ```
    /// use ms_audio::fft::FftPipeline;
    /// let mut fft = FftPipeline::new(256);
    /// let mut power = vec![0.0f32; fft.n_bins()];
    /// fft.power_spectrum(&[0.0; 256], &mut power);
    /// assert!(power.iter().all(|p| *p == 0.0));
    /// ```
    pub fn power_spectrum(&mut self, frame: &[f32], power: &mut [f32]) {
        debug_assert_eq!(power.len(), self.spectrum_buf.len());
        let n = self.fft_size.min(frame.len());

        // Copy and window
        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n { frame[i] * self.window[i] } else { 0.0 };
        }

        // Forward FFT
        if self
            .plan
            .process_with_scratch(
                &mut self.input_buf,
                &mut self.spectrum_buf,
                &mut self.scratch,
            )
            .is_err()
        {
            power.fill(0.0);
            return;
        }

        for (slot, c) in power.iter_mut().zip(&self.spectrum_buf) {
            *slot = c.re * c.re + c.im * c.im;
        }
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of non-negative frequency bins, `N/2 + 1`.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Periodic Hann window (the DFT-even variant used for spectral analysis).
#[must_use]
pub fn hann_periodic(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / size as f64;
            (0.5 - 0.5 * phase.cos()) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_hann_starts_at_zero_and_peaks_mid() {
        let w = hann_periodic(8);
        assert!(w[0].abs() < 1e-7);
        assert!((w[4] - 1.0).abs() < 1e-6);
        // periodic: w[1] == w[7]
        assert!((w[1] - w[7]).abs() < 1e-6);
    }

    #[test]
    fn sine_energy_lands_in_its_bin() {
        let size = 512;
        let mut fft = FftPipeline::new(size);
        // Exactly 32 cycles per window
        let frame: Vec<f32> = (0..size)
            .map(|i| (2.0 * std::f32::consts::PI * 32.0 * i as f32 / size as f32).sin())
            .collect();
        let mut power = vec![0.0; fft.n_bins()];
        fft.power_spectrum(&frame, &mut power);

        let peak = power
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc });
        assert_eq!(peak.0, 32);
    }
}

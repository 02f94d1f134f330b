//! Slaney-style mel scale and triangular filterbank.
//!
//! Linear below 1 kHz (200/3 Hz per mel), logarithmic above, with filters
//! normalised to constant area so that wide high-frequency bands do not
//! dominate.

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz → mel (Slaney).
///
/// # Example
/// ```
/// use ms_audio::mel::hz_to_mel;
/// assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel → Hz (Slaney), inverse of [`hz_to_mel`].
#[must_use]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// `n` frequencies evenly spaced on the mel scale between `fmin` and `fmax`.
#[must_use]
pub fn mel_frequencies(n: usize, fmin: f64, fmax: f64) -> Vec<f64> {
    let lo = hz_to_mel(fmin);
    let hi = hz_to_mel(fmax);
    if n < 2 {
        return vec![mel_to_hz(lo); n];
    }
    (0..n)
        .map(|i| mel_to_hz(lo + (hi - lo) * i as f64 / (n - 1) as f64))
        .collect()
}

/// One band: first non-zero FFT bin and its weights.
struct Band {
    start: usize,
    weights: Vec<f32>,
}

/// Projects a linear power spectrum onto `n_mels` mel bands.
///
/// # Example
/// ```
/// use ms_audio::mel::MelFilterbank;
/// let bank = MelFilterbank::new(22050, 2048, 128, 0.0, 11025.0);
/// assert_eq!(bank.n_mels(), 128);
/// assert_eq!(bank.n_fft_bins(), 1025);
/// ```
pub struct MelFilterbank {
    bands: Vec<Band>,
    n_fft_bins: usize,
}

impl MelFilterbank {
    #[must_use]
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize, fmin: f32, fmax: f32) -> Self {
        let n_fft_bins = n_fft / 2 + 1;
        let nyquist = f64::from(sample_rate) / 2.0;
        let fft_freqs: Vec<f64> = (0..n_fft_bins)
            .map(|k| nyquist * k as f64 / (n_fft_bins - 1).max(1) as f64)
            .collect();

        let mel_f = mel_frequencies(n_mels + 2, f64::from(fmin), f64::from(fmax));

        let bands = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (mel_f[m], mel_f[m + 1], mel_f[m + 2]);
                let lower_width = center - left;
                let upper_width = right - center;
                let enorm = if right > left { 2.0 / (right - left) } else { 0.0 };

                let raw: Vec<f64> = fft_freqs
                    .iter()
                    .map(|&f| {
                        let lower = if lower_width > 0.0 {
                            (f - left) / lower_width
                        } else {
                            0.0
                        };
                        let upper = if upper_width > 0.0 {
                            (right - f) / upper_width
                        } else {
                            0.0
                        };
                        lower.min(upper).max(0.0) * enorm
                    })
                    .collect();

                let start = raw.iter().position(|w| *w > 0.0).unwrap_or(0);
                let end = raw.iter().rposition(|w| *w > 0.0).map_or(start, |e| e + 1);
                Band {
                    start,
                    weights: raw[start..end].iter().map(|w| *w as f32).collect(),
                }
            })
            .collect();

        Self { bands, n_fft_bins }
    }

    #[must_use]
    pub fn n_mels(&self) -> usize {
        self.bands.len()
    }

    #[must_use]
    pub fn n_fft_bins(&self) -> usize {
        self.n_fft_bins
    }

    /// Weighted sum of `power` into each band of `out`.
    pub fn apply(&self, power: &[f32], out: &mut [f32]) {
        debug_assert_eq!(power.len(), self.n_fft_bins);
        for (slot, band) in out.iter_mut().zip(&self.bands) {
            *slot = band
                .weights
                .iter()
                .zip(&power[band.start..])
                .map(|(w, p)| w * p)
                .sum();
        }
    }

    /// Dense weight of FFT bin `k` in band `m`.
    #[must_use]
    pub fn weight(&self, m: usize, k: usize) -> f32 {
        let band = &self.bands[m];
        k.checked_sub(band.start)
            .and_then(|i| band.weights.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}

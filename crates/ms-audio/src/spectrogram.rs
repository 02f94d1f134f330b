use ms_core::config::SpectrogramConfig;
use ms_core::frame::{SpectrogramAxes, SpectrogramMatrix, Waveform};

use crate::fft::FftPipeline;
use crate::mel::MelFilterbank;

/// Analyseur mel offline : STFT centrée, spectre de puissance, banc mel.
///
/// Built per sample rate; the FFT plan and filterbank are reused across
/// frames.
///
/// # Example
/// ```
/// use ms_audio::spectrogram::MelSpectrogram;
/// use ms_core::config::SpectrogramConfig;
/// use ms_core::frame::Waveform;
///
/// let mut mel = MelSpectrogram::new(&SpectrogramConfig::default(), 22050);
/// let wave = Waveform::new(vec![0.0; 22050], 22050);
/// let power = mel.compute(&wave);
/// assert_eq!(power.n_bins(), 128);
/// assert_eq!(power.n_frames(), 1 + 22050 / 512);
/// ```
pub struct MelSpectrogram {
    fft: FftPipeline,
    bank: MelFilterbank,
    hop_length: usize,
    axes: SpectrogramAxes,
}

impl MelSpectrogram {
    #[must_use]
    pub fn new(config: &SpectrogramConfig, sample_rate: u32) -> Self {
        let nyquist = sample_rate as f32 / 2.0;
        let fmax = config.fmax.map_or(nyquist, |f| f.min(nyquist));
        let fmin = config.fmin.min(fmax);
        let hop_length = config.hop_length.max(1);

        Self {
            fft: FftPipeline::new(config.n_fft),
            bank: MelFilterbank::new(sample_rate, config.n_fft, config.n_mels, fmin, fmax),
            hop_length,
            axes: SpectrogramAxes {
                sample_rate,
                hop_length,
                fmin,
                fmax,
            },
        }
    }

    /// Mel power spectrogram of `wave`.
    ///
    /// Frames are centred: the signal is zero-padded by `n_fft / 2` on each
    /// side, giving `1 + len / hop_length` frames.
    #[must_use]
    pub fn compute(&mut self, wave: &Waveform) -> SpectrogramMatrix {
        let n_fft = self.fft.fft_size();
        let pad = n_fft / 2;

        let mut padded = vec![0.0f32; wave.len() + 2 * pad];
        padded[pad..pad + wave.len()].copy_from_slice(wave.samples());

        let n_frames = 1 + padded.len().saturating_sub(n_fft) / self.hop_length;
        let n_mels = self.bank.n_mels();
        let mut out = SpectrogramMatrix::new(n_mels, n_frames, self.axes);

        let mut power = vec![0.0f32; self.fft.n_bins()];
        let mut bands = vec![0.0f32; n_mels];
        for frame in 0..n_frames {
            let start = frame * self.hop_length;
            let end = (start + n_fft).min(padded.len());
            self.fft.power_spectrum(&padded[start..end], &mut power);
            self.bank.apply(&power, &mut bands);
            for (bin, &value) in bands.iter().enumerate() {
                out.set(bin, frame, value);
            }
        }

        log::debug!(
            "Mel spectrogram: {n_mels} bands × {n_frames} frames ({:.2}s @ {}Hz)",
            wave.duration_secs(),
            wave.sample_rate()
        );
        out
    }
}

/// Convert power to decibels referenced to the matrix's own maximum.
///
/// `10·log10(max(amin, S)) − 10·log10(max(amin, max(S)))`, then floored at
/// `−top_db` when given. The loudest cell is exactly 0 dB.
///
/// # Example
/// ```
/// use ms_audio::spectrogram::power_to_db;
/// use ms_core::frame::{SpectrogramAxes, SpectrogramMatrix};
///
/// let axes = SpectrogramAxes { sample_rate: 8000, hop_length: 64, fmin: 0.0, fmax: 4000.0 };
/// let mut m = SpectrogramMatrix::new(1, 2, axes);
/// m.set(0, 0, 1.0);
/// m.set(0, 1, 0.1);
/// let db = power_to_db(m, 1e-10, Some(80.0));
/// assert_eq!(db.get(0, 0), 0.0);
/// assert!((db.get(0, 1) + 10.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn power_to_db(mut power: SpectrogramMatrix, amin: f32, top_db: Option<f32>) -> SpectrogramMatrix {
    let amin = amin.max(f32::MIN_POSITIVE);
    let reference = power.max().max(amin);
    let ref_db = 10.0 * reference.log10();
    let floor = top_db.map(|t| -t.abs());

    for v in power.values_mut() {
        let mut db = 10.0 * v.max(amin).log10() - ref_db;
        if let Some(floor) = floor {
            db = db.max(floor);
        }
        *v = db;
    }
    power
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, secs: f32, sample_rate: u32) -> Waveform {
        let n = (secs * sample_rate as f32) as usize;
        let samples = (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        Waveform::new(samples, sample_rate)
    }

    #[test]
    fn db_scale_peaks_at_zero_and_respects_floor() {
        let config = SpectrogramConfig::default();
        let mut mel = MelSpectrogram::new(&config, 22050);
        let power = mel.compute(&tone(440.0, 2.0, 22050));
        assert_eq!(power.n_frames(), 1 + 44100 / 512);

        let db = power_to_db(power, config.amin, Some(config.top_db));
        assert_eq!(db.max(), 0.0);
        assert!(db.values().iter().all(|v| *v <= 0.0));
        assert!(db.min() >= -80.0);
    }

    #[test]
    fn unbounded_db_keeps_quiet_cells() {
        let axes = SpectrogramAxes {
            sample_rate: 8000,
            hop_length: 64,
            fmin: 0.0,
            fmax: 4000.0,
        };
        let mut m = SpectrogramMatrix::new(1, 3, axes);
        m.set(0, 0, 1.0);
        m.set(0, 1, 1e-9);
        m.set(0, 2, 0.0);

        let db = power_to_db(m.clone(), 1e-10, None);
        assert_eq!(db.get(0, 0), 0.0);
        assert!((db.get(0, 1) + 90.0).abs() < 1e-3);
        assert!((db.get(0, 2) + 100.0).abs() < 1e-3);

        let floored = power_to_db(m, 1e-10, Some(80.0));
        assert_eq!(floored.min(), -80.0);
    }

    #[test]
    fn tone_energy_sits_in_low_bands() {
        let mut mel = MelSpectrogram::new(&SpectrogramConfig::default(), 22050);
        let power = mel.compute(&tone(440.0, 1.0, 22050));
        let mid = power.n_frames() / 2;
        let loudest = (0..power.n_bins())
            .max_by(|&a, &b| power.get(a, mid).total_cmp(&power.get(b, mid)))
            .unwrap_or(0);
        // 440 Hz ≈ 6.6 mel out of ≈ 49.9 across 128 bands
        assert!((10..25).contains(&loudest), "loudest band {loudest}");
    }

    #[test]
    fn silence_is_flat_zero_db() {
        let mut mel = MelSpectrogram::new(&SpectrogramConfig::default(), 8000);
        let power = mel.compute(&Waveform::new(vec![0.0; 4000], 8000));
        let db = power_to_db(power, 1e-10, Some(80.0));
        assert!(db.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn short_signal_still_yields_one_frame() {
        let mut mel = MelSpectrogram::new(&SpectrogramConfig::default(), 22050);
        let power = mel.compute(&Waveform::new(vec![0.1; 10], 22050));
        assert_eq!(power.n_frames(), 1);
    }

    #[test]
    fn fmax_is_capped_at_nyquist() {
        let config = SpectrogramConfig {
            fmax: Some(50_000.0),
            ..SpectrogramConfig::default()
        };
        let mel = MelSpectrogram::new(&config, 16000);
        assert_eq!(mel.axes.fmax, 8000.0);
    }
}

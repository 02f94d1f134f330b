use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ms_audio::{AudioError, MelSpectrogram, power_to_db};
use ms_core::config::{MelscopeConfig, SpectrogramConfig};
use ms_core::frame::{SpectrogramMatrix, Waveform};
use ms_core::traits::AudioDecoder;
use ms_render::Figure;

/// Résultat du traitement d'un fichier audio.
#[derive(Debug)]
pub enum SpectrogramOutcome {
    /// Image written to `output`.
    Saved { output: PathBuf },
    /// Nothing written; `error` carries the cause.
    Failed { input: PathBuf, error: anyhow::Error },
}

impl SpectrogramOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

impl fmt::Display for SpectrogramOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved { output } => write!(f, "Spectrogram saved: {}", output.display()),
            Self::Failed { error, .. }
                if matches!(error.downcast_ref::<AudioError>(), Some(AudioError::EmptyAudio { .. })) =>
            {
                write!(f, "Error: {error}")
            }
            Self::Failed { input, error } => {
                write!(f, "Error processing {}: {error:#}", input.display())
            }
        }
    }
}

/// Décode `input`, calcule son spectrogramme mel en dB et l'écrit dans `output`.
///
/// Never fails as a function: every error is folded into
/// [`SpectrogramOutcome::Failed`] so a batch can move on.
pub fn audio_to_spectrogram(
    decoder: &dyn AudioDecoder,
    input: &Path,
    output: &Path,
    config: &MelscopeConfig,
) -> SpectrogramOutcome {
    match render(decoder, input, output, config) {
        Ok(()) => SpectrogramOutcome::Saved {
            output: output.to_path_buf(),
        },
        Err(error) => {
            log::debug!("{} failed: {error:#}", input.display());
            SpectrogramOutcome::Failed {
                input: input.to_path_buf(),
                error,
            }
        }
    }
}

fn render(
    decoder: &dyn AudioDecoder,
    input: &Path,
    output: &Path,
    config: &MelscopeConfig,
) -> Result<()> {
    let wave = decoder.decode(input)?;
    if wave.is_empty() {
        return Err(AudioError::EmptyAudio {
            path: input.to_path_buf(),
        }
        .into());
    }
    log::info!(
        "{}: {} samples @ {} Hz ({:.2}s)",
        input.display(),
        wave.len(),
        wave.sample_rate(),
        wave.duration_secs()
    );

    let db = db_spectrogram(&wave, &config.spectrogram);
    drop(wave);

    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut figure = Figure::new(&config.render);
    figure
        .draw_spectrogram(&db, &format!("Mel Spectrogram: {name}"))
        .context("Cannot draw spectrogram")?;
    figure.save(output)
}

/// Mel power spectrogram in dB. A negative `top_db` leaves the range unbounded.
fn db_spectrogram(wave: &Waveform, spec: &SpectrogramConfig) -> SpectrogramMatrix {
    let power = MelSpectrogram::new(spec, wave.sample_rate()).compute(wave);
    let top_db = (spec.top_db >= 0.0).then_some(spec.top_db);
    power_to_db(power, spec.amin, top_db)
}

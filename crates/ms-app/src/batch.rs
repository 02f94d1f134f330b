use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use ms_core::config::{DiscoveryOrder, MelscopeConfig};
use ms_core::traits::AudioDecoder;

use crate::spectrogram::{SpectrogramOutcome, audio_to_spectrogram};

/// Compteurs d'un lot terminé.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub failed: usize,
}

/// Issue d'un lot audio.
#[derive(Debug, PartialEq, Eq)]
pub enum AudioBatch {
    /// No file with the configured extension; nothing was attempted.
    NoInputs { extension: String },
    Completed(BatchSummary),
}

impl fmt::Display for AudioBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInputs { extension } => write!(
                f,
                "No {} files found in the input folder.",
                extension.to_uppercase()
            ),
            Self::Completed(s) => write!(f, "{} spectrogram(s) saved, {} failed.", s.saved, s.failed),
        }
    }
}

/// Regular files of `dir` whose name ends in `.<extension>`, any case.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn discover_audio(dir: &Path, extension: &str, order: DiscoveryOrder) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.to_lowercase());
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Cannot read input folder {}", dir.display()))?
    {
        let path = entry?.path();
        let matches = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().to_lowercase().ends_with(&suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    order.apply(&mut files);
    Ok(files)
}

/// Traite chaque fichier audio de `input_dir` et écrit un spectrogramme par
/// fichier dans `output_dir`.
///
/// `output_dir` is created if needed. Each input is attempted exactly once and
/// its outcome handed to `on_item` before the next one starts.
///
/// # Errors
/// Returns an error only if `output_dir` cannot be created or `input_dir`
/// cannot be listed; per-file failures are reported through `on_item`.
pub fn process_all_audio(
    decoder: &dyn AudioDecoder,
    input_dir: &Path,
    output_dir: &Path,
    config: &MelscopeConfig,
    mut on_item: impl FnMut(&SpectrogramOutcome),
) -> Result<AudioBatch> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create output folder {}", output_dir.display()))?;

    let batch = &config.batch;
    let inputs = discover_audio(input_dir, &batch.audio_extension, batch.order)?;
    if inputs.is_empty() {
        return Ok(AudioBatch::NoInputs {
            extension: batch.audio_extension.clone(),
        });
    }
    log::info!("{} audio file(s) in {}", inputs.len(), input_dir.display());

    let mut summary = BatchSummary::default();
    for input in &inputs {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("{stem}.{}", batch.image_extension));

        let started = Instant::now();
        let outcome = audio_to_spectrogram(decoder, input, &output, config);
        log::debug!("{} in {:.0?}", input.display(), started.elapsed());

        if outcome.is_saved() {
            summary.saved += 1;
        } else {
            summary.failed += 1;
        }
        on_item(&outcome);
    }
    Ok(AudioBatch::Completed(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{EmptyDecoder, ToneDecoder, test_config, write_tone_wav};
    use ms_audio::SymphoniaDecoder;

    #[test]
    fn tone_file_becomes_png() -> Result<()> {
        let root = tempfile::tempdir()?;
        let input = root.path().join("input");
        let output = root.path().join("output");
        fs::create_dir(&input)?;
        write_tone_wav(&input.join("a.wav"), 440.0, 2.0, 22050)?;

        let mut lines = Vec::new();
        let batch = process_all_audio(&SymphoniaDecoder, &input, &output, &test_config(), |o| {
            lines.push(o.to_string());
        })?;

        let expected = output.join("a.png");
        assert_eq!(batch, AudioBatch::Completed(BatchSummary { saved: 1, failed: 0 }));
        assert_eq!(lines, [format!("Spectrogram saved: {}", expected.display())]);
        assert!(expected.is_file());
        Ok(())
    }

    #[test]
    fn no_inputs_creates_empty_output() -> Result<()> {
        let root = tempfile::tempdir()?;
        let input = root.path().join("input");
        let output = root.path().join("output");
        fs::create_dir(&input)?;
        fs::write(input.join("notes.txt"), b"hello")?;

        let mut config = test_config();
        config.batch.audio_extension = "mp3".into();
        let mut calls = 0;
        let batch = process_all_audio(&ToneDecoder { seconds: 0.1 }, &input, &output, &config, |_| {
            calls += 1;
        })?;

        assert_eq!(batch.to_string(), "No MP3 files found in the input folder.");
        assert_eq!(calls, 0);
        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output)?.count(), 0);
        Ok(())
    }

    #[test]
    fn failures_do_not_stop_the_batch() -> Result<()> {
        let root = tempfile::tempdir()?;
        let input = root.path().join("input");
        let output = root.path().join("output");
        fs::create_dir(&input)?;
        write_tone_wav(&input.join("b.WAV"), 220.0, 0.3, 16000)?;
        fs::write(input.join("a.wav"), b"garbage")?;
        write_tone_wav(&input.join("c.wav"), 880.0, 0.3, 16000)?;

        let mut seen = Vec::new();
        let batch = process_all_audio(&SymphoniaDecoder, &input, &output, &test_config(), |o| {
            seen.push(o.is_saved());
        })?;

        assert_eq!(seen, [false, true, true]);
        assert_eq!(batch, AudioBatch::Completed(BatchSummary { saved: 2, failed: 1 }));
        assert!(output.join("b.png").is_file());
        assert!(!output.join("a.png").exists());
        Ok(())
    }

    #[test]
    fn empty_audio_counts_as_failed() -> Result<()> {
        let root = tempfile::tempdir()?;
        let input = root.path().join("input");
        let output = root.path().join("output");
        fs::create_dir(&input)?;
        fs::write(input.join("x.wav"), b"")?;

        let batch = process_all_audio(&EmptyDecoder, &input, &output, &test_config(), |_| {})?;
        assert_eq!(batch, AudioBatch::Completed(BatchSummary { saved: 0, failed: 1 }));
        assert_eq!(fs::read_dir(&output)?.count(), 0);
        Ok(())
    }

    #[test]
    fn discovery_skips_directories_and_sorts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("folder.mp3"))?;
        for name in ["z.mp3", "A.MP3", "m.mp3.bak"] {
            fs::write(dir.path().join(name), b"")?;
        }
        let files = discover_audio(dir.path(), "mp3", DiscoveryOrder::Lexicographic)?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["A.MP3", "z.mp3"]);
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_discovered() -> Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir()?;
        let name = OsStr::from_bytes(b"caf\xe9.mp3");
        fs::write(dir.path().join(name), b"")?;
        let files = discover_audio(dir.path(), "mp3", DiscoveryOrder::Lexicographic)?;
        assert_eq!(files, [dir.path().join(name)]);
        Ok(())
    }

    #[test]
    fn missing_input_dir_is_an_error() -> Result<()> {
        let root = tempfile::tempdir()?;
        let result = process_all_audio(
            &EmptyDecoder,
            &root.path().join("nope"),
            &root.path().join("out"),
            &test_config(),
            |_| {},
        );
        assert!(result.is_err());
        Ok(())
    }
}

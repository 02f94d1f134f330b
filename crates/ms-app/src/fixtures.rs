//! Shared helpers for the binary's unit tests.

use std::f32::consts::TAU;
use std::path::Path;

use anyhow::Result;
use ms_core::config::MelscopeConfig;
use ms_core::frame::Waveform;
use ms_core::traits::AudioDecoder;

/// Small figures and WAV inputs keep the tests fast.
pub fn test_config() -> MelscopeConfig {
    let mut config = MelscopeConfig::default();
    config.render.dpi = 50;
    config.batch.audio_extension = "wav".into();
    config
}

pub fn write_tone_wav(path: &Path, freq: f32, seconds: f32, sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    let n = (seconds * sample_rate as f32) as usize;
    for i in 0..n {
        let t = i as f32 / sample_rate as f32;
        writer.write_sample(((TAU * freq * t).sin() * 0.5 * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Synthesises a 440 Hz tone whatever the path.
pub struct ToneDecoder {
    pub seconds: f32,
}

impl AudioDecoder for ToneDecoder {
    fn decode(&self, _path: &Path) -> Result<Waveform> {
        let sr = 16_000u32;
        let n = (self.seconds * sr as f32) as usize;
        let samples = (0..n)
            .map(|i| (TAU * 440.0 * i as f32 / sr as f32).sin())
            .collect();
        Ok(Waveform::new(samples, sr))
    }
}

/// Decodes every file to zero samples.
pub struct EmptyDecoder;

impl AudioDecoder for EmptyDecoder {
    fn decode(&self, _path: &Path) -> Result<Waveform> {
        Ok(Waveform::new(Vec::new(), 22_050))
    }
}

/// Writes a `width × height` grayscale pattern to `path`; format from the extension.
pub fn write_pattern(path: &Path, width: u32, height: u32, seed: u32) -> Result<()> {
    let img = image::GrayImage::from_fn(width, height, |x, y| {
        image::Luma([((x * 7 + y * 13 + seed * 31) % 256) as u8])
    });
    img.save(path)?;
    Ok(())
}

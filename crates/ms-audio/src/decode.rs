use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use ms_core::frame::Waveform;
use ms_core::traits::AudioDecoder;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// [`AudioDecoder`] backed by symphonia (WAV, MP3, FLAC, OGG, AAC, MP4, MKV).
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<Waveform> {
        let (samples, sample_rate) = decode_file(path)?;
        Ok(Waveform::new(samples, sample_rate))
    }
}

/// Decode an audio file into mono f32 samples at its native sample rate.
///
/// Channels are averaged; no resampling is performed.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed, or has no track.
///
/// # Example
/// ```no_run
/// use ms_audio::decode::decode_file;
/// let (samples, sample_rate) = decode_file("track.mp3").unwrap();
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<(Vec<f32>, u32)> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Cannot open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;

    let mut format = probed.format;
    let track = format.default_track().ok_or(AudioError::NoTrack)?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    // Container-level count may be absent; each decoded packet carries its own.
    let mut channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))
        .context("Failed to create audio decoder")?;

    let track_id = track.id;
    let mut all_samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;
    let mut buf_spec = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Audio decode packet error in {}: {e}", path.display());
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Audio decode frame error in {}: {e}", path.display());
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger or laid out differently
        if sample_buf.is_none() || num_frames > max_sample_frames || buf_spec != Some(spec) {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
            buf_spec = Some(spec);
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        channels = spec.channels.count().max(1);
        downmix_into(&mut all_samples, buf.samples(), channels);
    }

    log::info!(
        "Decoded {} samples @ {}Hz ({} channel(s)) from {}",
        all_samples.len(),
        sample_rate,
        channels,
        path.display()
    );

    Ok((all_samples, sample_rate))
}

/// Average interleaved frames of `channels` samples into `out`, one value per frame.
fn downmix_into(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    out.extend(
        interleaved
            .chunks(channels.max(1))
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize) -> Result<()> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let v = (0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 32767.0) as i16;
            for _ in 0..channels {
                writer.write_sample(v)?;
            }
        }
        writer.finalize()?;
        Ok(())
    }

    #[test]
    fn stereo_wav_is_downmixed_at_native_rate() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        write_wav(&path, 2, 22050, 22050)?;

        let wave = SymphoniaDecoder.decode(&path)?;
        assert_eq!(wave.sample_rate(), 22050);
        assert_eq!(wave.len(), 22050);
        let peak = wave.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.01, "peak {peak}");
        Ok(())
    }

    #[test]
    fn downmix_follows_the_given_channel_count() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mut mono = Vec::new();
        downmix_into(&mut mono, &interleaved, 2);
        assert_eq!(mono, [0.5, 0.5, 0.0]);

        mono.clear();
        downmix_into(&mut mono, &interleaved, 3);
        assert_eq!(mono.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = SymphoniaDecoder.decode(Path::new("/no/such/file.mp3"));
        assert!(err.is_err());
    }

    #[test]
    fn garbage_bytes_fail_to_probe() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio")?;
        let outcome = SymphoniaDecoder.decode(&path);
        // Either the probe rejects it or nothing decodes.
        assert!(outcome.is_err() || outcome.is_ok_and(|w| w.is_empty()));
        Ok(())
    }
}

// Audio decoding and mel spectrogram analysis for melscope.

pub mod decode;
pub mod error;
pub mod fft;
pub mod mel;
pub mod spectrogram;

pub use decode::SymphoniaDecoder;
pub use error::AudioError;
pub use spectrogram::{MelSpectrogram, power_to_db};

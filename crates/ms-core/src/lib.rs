/// Configuration, types, and shared structures for melscope.
///
/// This crate contains the data model shared by the spectrogram and
/// similarity pipelines, the TOML configuration, and the decoder seam.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use color::Colormap;
pub use config::{DiscoveryOrder, MelscopeConfig};
pub use error::CoreError;
pub use frame::{GrayFrame, SpectrogramMatrix, Waveform};
pub use traits::AudioDecoder;

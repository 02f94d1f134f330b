use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Decoding succeeded but yielded zero samples.
    #[error("The audio file '{}' is empty or corrupted.", path.display())]
    EmptyAudio {
        /// File that produced no samples.
        path: PathBuf,
    },

    /// The container holds no decodable audio track.
    #[error("No default audio track found")]
    NoTrack,

    /// Audio decode error.
    #[error("Decode error: {0}")]
    Decode(String),
}

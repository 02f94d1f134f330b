use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid width/height dimensions.
    #[error("Invalid dimensions: {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// A pixel buffer does not match its declared dimensions.
    #[error("Buffer length {len} does not match {width}×{height}")]
    BufferLength {
        /// Actual buffer length.
        len: usize,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}

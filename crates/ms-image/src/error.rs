use thiserror::Error;

/// Errors raised by the structural similarity metric.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimilarityError {
    /// Both images must share `(width, height)`.
    #[error("Input images must have the same dimensions: {a_width}×{a_height} vs {b_width}×{b_height}")]
    ShapeMismatch {
        /// Width of the first image.
        a_width: u32,
        /// Height of the first image.
        a_height: u32,
        /// Width of the second image.
        b_width: u32,
        /// Height of the second image.
        b_height: u32,
    },

    /// The window does not fit inside the image.
    #[error("Image {width}×{height} is smaller than the {win_size}×{win_size} window")]
    TooSmall {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Side of the square window.
        win_size: usize,
    },
}

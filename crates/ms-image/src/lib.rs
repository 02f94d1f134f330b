/// Grayscale image loading, resampling, discovery, and structural similarity.

pub mod error;
pub mod folder;
pub mod image;
pub mod resize;
pub mod ssim;

pub use error::SimilarityError;
pub use ssim::structural_similarity;

use std::path::Path;

use crate::frame::Waveform;

/// Décode un fichier audio en forme d'onde mono.
///
/// Implémenté par : `SymphoniaDecoder`. Les tests fournissent des
/// décodeurs synthétiques.
///
/// # Example
/// ```
/// use ms_core::traits::AudioDecoder;
/// use ms_core::frame::Waveform;
/// use std::path::Path;
///
/// struct Silence;
/// impl AudioDecoder for Silence {
///     fn decode(&self, _path: &Path) -> anyhow::Result<Waveform> {
///         Ok(Waveform::new(vec![0.0; 1024], 8000))
///     }
/// }
/// ```
pub trait AudioDecoder {
    /// Decode `path` to mono samples at the file's native sample rate.
    ///
    /// # Errors
    /// Returns an error when the file is missing, unsupported, or corrupt.
    fn decode(&self, path: &Path) -> anyhow::Result<Waveform>;
}

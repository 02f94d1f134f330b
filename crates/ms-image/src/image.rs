use std::path::Path;

use anyhow::{Context, Result};
use ms_core::frame::GrayFrame;

/// Charge une image en niveaux de gris 8 bits.
///
/// Returns `Ok(None)` when the file does not exist, so callers can skip the
/// item without treating it as a failure. Unreadable or undecodable files
/// are errors.
///
/// # Errors
/// Returns an error if the file exists but cannot be decoded.
///
/// # Example
/// ```no_run
/// use ms_image::image::load_grayscale;
/// use std::path::Path;
/// let frame = load_grayscale(Path::new("output/a.png")).unwrap();
/// ```
pub fn load_grayscale(path: &Path) -> Result<Option<GrayFrame>> {
    if !path.exists() {
        log::warn!("Image not found: {}", path.display());
        return Ok(None);
    }
    let img = image::open(path).with_context(|| format!("Cannot load {}", path.display()))?;
    let (width, height) = (img.width(), img.height());
    let data = if img.color().has_color() {
        img.to_rgb8().pixels().map(|p| bt601_luma(p.0)).collect()
    } else {
        img.to_luma8().into_raw()
    };
    Ok(Some(GrayFrame {
        data,
        width,
        height,
    }))
}

/// ITU-R BT.601 luma, `Y = 0.299 R + 0.587 G + 0.114 B`, rounded.
#[inline]
fn bt601_luma([r, g, b]: [u8; 3]) -> u8 {
    let y = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((y + 500) / 1000) as u8
}

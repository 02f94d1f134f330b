use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use ms_core::error::CoreError;
use ms_core::frame::GrayFrame;

/// Resizer réutilisable wrappant fast_image_resize, interpolation bilinéaire.
///
/// # Example
/// ```
/// use ms_image::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (the resizer API wants `&mut` on it).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new bilinear resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            src_buf: Vec::new(),
        }
    }

    /// Resample `src` to `width × height`.
    ///
    /// Same-shape requests return an exact copy.
    ///
    /// # Errors
    /// Returns an error for zero dimensions or a failed resize.
    ///
    /// # Example
    /// ```
    /// use ms_image::resize::Resizer;
    /// use ms_core::frame::GrayFrame;
    /// let mut r = Resizer::new();
    /// let src = GrayFrame::new(100, 100);
    /// let dst = r.resize(&src, 50, 40).unwrap();
    /// assert_eq!(dst.shape(), (50, 40));
    /// ```
    pub fn resize(&mut self, src: &GrayFrame, width: u32, height: u32) -> Result<GrayFrame> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height }.into());
        }
        if src.shape() == (width, height) {
            return Ok(src.clone());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8)
                .context("Invalid source dimensions")?;
        let mut dst_image = Image::new(width, height, PixelType::U8);

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(GrayFrame::from_raw(width, height, dst_image.into_vec())?)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for one-shot usage.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use ms_image::resize::resize_gray;
/// use ms_core::frame::GrayFrame;
/// let src = GrayFrame::new(30, 20);
/// let dst = resize_gray(&src, 60, 10).unwrap();
/// assert_eq!(dst.width, 60);
/// ```
pub fn resize_gray(src: &GrayFrame, width: u32, height: u32) -> Result<GrayFrame> {
    Resizer::new().resize(src, width, height)
}

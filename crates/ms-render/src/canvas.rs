use image::{Rgb, RgbImage};

/// Pixel-space rectangle, `x`/`y` at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    #[must_use]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// Surface RGB8 sur laquelle la figure est dessinée.
///
/// All primitives clip silently at the edges.
///
/// # Example
/// ```
/// use ms_render::canvas::Canvas;
/// let mut c = Canvas::new(20, 10, [255, 255, 255]);
/// c.fill_rect(2, 2, 3, 3, [0, 0, 0]);
/// assert_eq!(c.pixel(3, 3), [0, 0, 0]);
/// ```
pub struct Canvas {
    img: RgbImage,
    background: [u8; 3],
}

impl Canvas {
    #[must_use]
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            img: RgbImage::from_pixel(width, height, Rgb(background)),
            background,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.img.get_pixel(x, y).0
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x < self.img.width() && y < self.img.height() {
            self.img.put_pixel(x, y, Rgb(color));
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        let x_end = x.saturating_add(w).min(self.img.width());
        let y_end = y.saturating_add(h).min(self.img.height());
        for py in y..y_end {
            for px in x..x_end {
                self.img.put_pixel(px, py, Rgb(color));
            }
        }
    }

    /// Horizontal line `thickness` pixels tall, growing downward from `y`.
    pub fn hline(&mut self, x: u32, y: u32, w: u32, thickness: u32, color: [u8; 3]) {
        self.fill_rect(x, y, w, thickness.max(1), color);
    }

    /// Vertical line `thickness` pixels wide, growing rightward from `x`.
    pub fn vline(&mut self, x: u32, y: u32, h: u32, thickness: u32, color: [u8; 3]) {
        self.fill_rect(x, y, thickness.max(1), h, color);
    }

    /// Outline of `rect`, drawn just outside it so the interior stays intact.
    pub fn stroke_rect(&mut self, rect: Rect, thickness: u32, color: [u8; 3]) {
        let t = thickness.max(1);
        let x0 = rect.x.saturating_sub(t);
        let y0 = rect.y.saturating_sub(t);
        let w = rect.w + 2 * t;
        self.hline(x0, y0, w, t, color);
        self.hline(x0, rect.bottom(), w, t, color);
        self.vline(x0, y0, rect.h + 2 * t, t, color);
        self.vline(rect.right(), y0, rect.h + 2 * t, t, color);
    }

    /// Smallest rectangle containing every non-background pixel.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Rect> {
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        for (x, y, p) in self.img.enumerate_pixels() {
            if p.0 != self.background {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        (min_x != u32::MAX).then(|| Rect {
            x: min_x,
            y: min_y,
            w: max_x - min_x + 1,
            h: max_y - min_y + 1,
        })
    }

    /// Tight crop around the content plus `pad` background pixels per side.
    ///
    /// An empty canvas collapses to a `2·pad` square of background.
    #[must_use]
    pub fn into_tight(self, pad: u32) -> RgbImage {
        let bounds = self.content_bounds().unwrap_or(Rect {
            x: 0,
            y: 0,
            w: 0,
            h: 0,
        });
        let out_w = (bounds.w + 2 * pad).max(1);
        let out_h = (bounds.h + 2 * pad).max(1);
        let mut out = RgbImage::from_pixel(out_w, out_h, Rgb(self.background));
        for dy in 0..bounds.h {
            for dx in 0..bounds.w {
                let p = *self.img.get_pixel(bounds.x + dx, bounds.y + dy);
                out.put_pixel(pad + dx, pad + dy, p);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];
    const BLACK: [u8; 3] = [0, 0, 0];

    #[test]
    fn drawing_clips_at_edges() {
        let mut c = Canvas::new(5, 5, WHITE);
        c.fill_rect(3, 3, 10, 10, BLACK);
        assert_eq!(c.pixel(4, 4), BLACK);
        assert_eq!(c.pixel(2, 2), WHITE);
    }

    #[test]
    fn tight_crop_keeps_padding() {
        let mut c = Canvas::new(100, 50, WHITE);
        c.fill_rect(40, 10, 5, 3, BLACK);
        let out = c.into_tight(4);
        assert_eq!(out.dimensions(), (13, 11));
        assert_eq!(out.get_pixel(4, 4).0, BLACK);
        assert_eq!(out.get_pixel(3, 4).0, WHITE);
    }

    #[test]
    fn stroke_surrounds_rect() {
        let mut c = Canvas::new(20, 20, WHITE);
        let r = Rect { x: 5, y: 5, w: 4, h: 4 };
        c.stroke_rect(r, 1, BLACK);
        assert_eq!(c.pixel(4, 4), BLACK);
        assert_eq!(c.pixel(9, 9), BLACK);
        assert_eq!(c.pixel(5, 5), WHITE);
        assert_eq!(c.content_bounds(), Some(Rect { x: 4, y: 4, w: 6, h: 6 }));
    }
}

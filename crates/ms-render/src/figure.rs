use std::path::Path;

use anyhow::{Context, Result, bail};
use ms_core::config::RenderConfig;
use ms_core::frame::SpectrogramMatrix;

use crate::axis::{Tick, db_ticks, mel_ticks, thin_ticks, time_ticks};
use crate::canvas::{Canvas, Rect};
use crate::font::{draw_text, draw_text_vertical, text_height, text_width};

const WHITE: [u8; 3] = [255, 255, 255];
const INK: [u8; 3] = [0, 0, 0];

// Subplot box, as fractions of the figure.
const AXES_LEFT: f32 = 0.125;
const AXES_RIGHT: f32 = 0.9;
const AXES_BOTTOM: f32 = 0.11;
const AXES_TOP: f32 = 0.88;

// Colorbar slot taken from the right of the axes.
const CBAR_FRACTION: f32 = 0.15;
const CBAR_PAD: f32 = 0.05;
const CBAR_ASPECT: f32 = 20.0;

// Typographic sizes, in points.
const SPINE_PT: f32 = 0.8;
const TICK_LEN_PT: f32 = 3.5;
const TICK_PAD_PT: f32 = 3.5;
const LABEL_PAD_PT: f32 = 4.0;
const TITLE_PAD_PT: f32 = 6.0;
const LABEL_FONT_PT: f32 = 10.0;
const TITLE_FONT_PT: f32 = 12.0;

/// Glyph cap height relative to the font size.
const CAP_RATIO: f32 = 0.73;

/// Pixel geometry derived once per figure.
struct Layout {
    plot: Rect,
    cbar: Rect,
    spine: u32,
    tick_len: u32,
    tick_pad: u32,
    label_pad: u32,
    title_pad: u32,
    label_scale: u32,
    title_scale: u32,
}

impl Layout {
    fn new(config: &RenderConfig, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let px = |pt: f32| config.points_to_px(pt).round().max(1.0) as u32;
        let font_scale = |pt: f32| ((config.points_to_px(pt) * CAP_RATIO / 7.0).round() as u32).max(1);

        let axes_x = AXES_LEFT * w;
        let axes_w = (AXES_RIGHT - AXES_LEFT) * w;
        let axes_y = (1.0 - AXES_TOP) * h;
        let axes_h = (AXES_TOP - AXES_BOTTOM) * h;

        let plot_w = axes_w * (1.0 - CBAR_FRACTION - CBAR_PAD);
        let cbar_x = axes_x + plot_w + CBAR_PAD * axes_w;
        let cbar_w = (axes_h / CBAR_ASPECT).min(CBAR_FRACTION * axes_w);

        let plot = Rect {
            x: axes_x.round() as u32,
            y: axes_y.round() as u32,
            w: (plot_w.round() as u32).max(1),
            h: (axes_h.round() as u32).max(1),
        };
        let cbar = Rect {
            x: cbar_x.round() as u32,
            y: plot.y,
            w: (cbar_w.round() as u32).max(1),
            h: plot.h,
        };

        Self {
            plot,
            cbar,
            spine: px(SPINE_PT),
            tick_len: px(TICK_LEN_PT),
            tick_pad: px(TICK_PAD_PT),
            label_pad: px(LABEL_PAD_PT),
            title_pad: px(TITLE_PAD_PT),
            label_scale: font_scale(LABEL_FONT_PT),
            title_scale: font_scale(TITLE_FONT_PT),
        }
    }
}

/// Figure raster hors-ligne : heatmap, axes, colorbar et titre.
///
/// La figure est consommée par [`Figure::save`] ; son tampon est libéré à la
/// sortie, qu'il y ait erreur ou non.
///
/// # Example
/// ```no_run
/// use ms_core::config::RenderConfig;
/// use ms_core::frame::{SpectrogramAxes, SpectrogramMatrix};
/// use ms_render::Figure;
///
/// let axes = SpectrogramAxes { sample_rate: 22050, hop_length: 512, fmin: 0.0, fmax: 11025.0 };
/// let db = SpectrogramMatrix::new(128, 43, axes);
/// let mut fig = Figure::new(&RenderConfig::default());
/// fig.draw_spectrogram(&db, "Mel Spectrogram: a.mp3").unwrap();
/// fig.save(std::path::Path::new("a.png")).unwrap();
/// ```
pub struct Figure {
    canvas: Canvas,
    config: RenderConfig,
    layout: Layout,
}

impl Figure {
    /// Blank white figure sized by `config`.
    #[must_use]
    pub fn new(config: &RenderConfig) -> Self {
        let (w, h) = config.canvas_size();
        Self {
            canvas: Canvas::new(w, h, WHITE),
            config: config.clone(),
            layout: Layout::new(config, w, h),
        }
    }

    /// Pixel box of the heatmap.
    #[must_use]
    pub fn plot_area(&self) -> Rect {
        self.layout.plot
    }

    /// Pixel box of the colorbar.
    #[must_use]
    pub fn colorbar_area(&self) -> Rect {
        self.layout.cbar
    }

    /// Pixel at `(x, y)` of the uncropped canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.canvas.pixel(x, y)
    }

    /// Draw a dB-scaled mel spectrogram with a time axis, a mel-warped Hz
    /// axis, a `+N dB` colorbar, and `title` on top.
    ///
    /// # Errors
    /// Returns an error if the matrix has no bins or no frames.
    pub fn draw_spectrogram(&mut self, db: &SpectrogramMatrix, title: &str) -> Result<()> {
        if db.n_bins() == 0 || db.n_frames() == 0 {
            bail!("Empty spectrogram ({} bins × {} frames)", db.n_bins(), db.n_frames());
        }
        let (vmin, vmax) = (db.min(), db.max());
        self.draw_heatmap(db, vmin, vmax);
        self.draw_colorbar(vmin, vmax);

        let axes = db.axes();
        self.draw_x_axis(&time_ticks(db.duration_secs()), "Time");
        let min_gap = text_height(self.layout.label_scale) * 3 / 2;
        let y_ticks = thin_ticks(mel_ticks(axes.fmin, axes.fmax), self.layout.plot.h, min_gap);
        self.draw_y_axis(&y_ticks, "Hz");
        self.draw_title(title);

        log::debug!(
            "Drew {}×{} spectrogram, range [{vmin:.1}, {vmax:.1}] dB",
            db.n_bins(),
            db.n_frames()
        );
        Ok(())
    }

    /// Crop to the drawn content plus the configured padding and write the
    /// image; the format follows the extension of `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be encoded or written.
    pub fn save(self, path: &Path) -> Result<()> {
        let pad = (self.config.pad_inches * self.config.dpi as f32).round() as u32;
        let img = self.canvas.into_tight(pad);
        img.save(path)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        log::debug!("Saved {}×{} figure to {}", img.width(), img.height(), path.display());
        Ok(())
    }

    fn draw_heatmap(&mut self, db: &SpectrogramMatrix, vmin: f32, vmax: f32) {
        let plot = self.layout.plot;
        let range = vmax - vmin;
        let (n_bins, n_frames) = (db.n_bins(), db.n_frames());
        let cmap = self.config.colormap;

        for py in 0..plot.h {
            // Row 0 is the top of the plot, i.e. the highest mel band.
            let bin = n_bins - 1 - (py as usize * n_bins / plot.h as usize);
            for px in 0..plot.w {
                let frame = px as usize * n_frames / plot.w as usize;
                let v = db.get(bin, frame);
                let t = if range > 0.0 { (v - vmin) / range } else { 0.0 };
                self.canvas.set_pixel(plot.x + px, plot.y + py, cmap.map(t));
            }
        }
        self.canvas.stroke_rect(plot, self.layout.spine, INK);
    }

    fn draw_colorbar(&mut self, vmin: f32, vmax: f32) {
        let l = &self.layout;
        let (cbar, spine, tick_len, tick_pad, scale) =
            (l.cbar, l.spine, l.tick_len, l.tick_pad, l.label_scale);
        let cmap = self.config.colormap;

        for py in 0..cbar.h {
            let t = 1.0 - py as f32 / (cbar.h.max(2) - 1) as f32;
            let color = cmap.map(t);
            for px in 0..cbar.w {
                self.canvas.set_pixel(cbar.x + px, cbar.y + py, color);
            }
        }
        self.canvas.stroke_rect(cbar, spine, INK);

        let tick_x = cbar.right() + spine;
        for tick in db_ticks(f64::from(vmin), f64::from(vmax)) {
            let y = frac_to_y(cbar, tick.frac);
            self.canvas.hline(tick_x, y.saturating_sub(spine / 2), tick_len, spine, INK);
            let ty = y.saturating_sub(text_height(scale) / 2);
            draw_text(&mut self.canvas, tick_x + tick_len + tick_pad, ty, &tick.label, scale, INK);
        }
    }

    fn draw_x_axis(&mut self, ticks: &[Tick], label: &str) {
        let l = &self.layout;
        let (plot, spine, tick_len, tick_pad, label_pad, scale) =
            (l.plot, l.spine, l.tick_len, l.tick_pad, l.label_pad, l.label_scale);

        let tick_y = plot.bottom() + spine;
        let text_y = tick_y + tick_len + tick_pad;
        for tick in ticks {
            let x = plot.x + (tick.frac * f64::from(plot.w)).round() as u32;
            self.canvas.vline(x.saturating_sub(spine / 2), tick_y, tick_len, spine, INK);
            let tx = x.saturating_sub(text_width(&tick.label, scale) / 2);
            draw_text(&mut self.canvas, tx, text_y, &tick.label, scale, INK);
        }

        let lx = (plot.x + plot.w / 2).saturating_sub(text_width(label, scale) / 2);
        let ly = text_y + text_height(scale) + label_pad;
        draw_text(&mut self.canvas, lx, ly, label, scale, INK);
    }

    fn draw_y_axis(&mut self, ticks: &[Tick], label: &str) {
        let l = &self.layout;
        let (plot, spine, tick_len, tick_pad, label_pad, scale) =
            (l.plot, l.spine, l.tick_len, l.tick_pad, l.label_pad, l.label_scale);

        let tick_right = plot.x.saturating_sub(spine);
        let text_right = tick_right.saturating_sub(tick_len + tick_pad);
        let mut widest = 0;
        for tick in ticks {
            let y = frac_to_y(plot, tick.frac);
            self.canvas.hline(
                tick_right.saturating_sub(tick_len),
                y.saturating_sub(spine / 2),
                tick_len,
                spine,
                INK,
            );
            let tw = text_width(&tick.label, scale);
            widest = widest.max(tw);
            let ty = y.saturating_sub(text_height(scale) / 2);
            draw_text(&mut self.canvas, text_right.saturating_sub(tw), ty, &tick.label, scale, INK);
        }

        // Rotated label: its box is text_height wide and text_width tall.
        let lx = text_right.saturating_sub(widest + label_pad + text_height(scale));
        let ly = (plot.y + plot.h / 2).saturating_sub(text_width(label, scale) / 2);
        draw_text_vertical(&mut self.canvas, lx, ly, label, scale, INK);
    }

    fn draw_title(&mut self, title: &str) {
        let l = &self.layout;
        let (plot, spine, pad, scale) = (l.plot, l.spine, l.title_pad, l.title_scale);
        let x = (plot.x + plot.w / 2).saturating_sub(text_width(title, scale) / 2);
        let y = plot.y.saturating_sub(spine + pad + text_height(scale));
        draw_text(&mut self.canvas, x, y, title, scale, INK);
    }
}

/// Vertical pixel of `frac` measured upward from the bottom of `rect`.
fn frac_to_y(rect: Rect, frac: f64) -> u32 {
    let offset = (frac.clamp(0.0, 1.0) * f64::from(rect.h)).round() as u32;
    (rect.bottom() - offset).min(rect.bottom().saturating_sub(1)).max(rect.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_core::color::Colormap;
    use ms_core::frame::SpectrogramAxes;

    fn small_config() -> RenderConfig {
        RenderConfig {
            dpi: 50,
            ..RenderConfig::default()
        }
    }

    fn ramp(n_bins: usize, n_frames: usize) -> SpectrogramMatrix {
        let axes = SpectrogramAxes {
            sample_rate: 22050,
            hop_length: 512,
            fmin: 0.0,
            fmax: 11025.0,
        };
        let mut m = SpectrogramMatrix::new(n_bins, n_frames, axes);
        for b in 0..n_bins {
            for f in 0..n_frames {
                m.set(b, f, -80.0 * (1.0 - b as f32 / (n_bins - 1) as f32));
            }
        }
        m
    }

    #[test]
    fn layout_matches_figure_fractions() {
        let fig = Figure::new(&small_config());
        let plot = fig.plot_area();
        let cbar = fig.colorbar_area();
        assert_eq!(plot.x, 63);
        assert_eq!(plot.y, 24);
        assert!(cbar.x > plot.right());
        assert!(cbar.right() <= 450);
        assert_eq!(cbar.h, plot.h);
    }

    #[test]
    fn heatmap_puts_high_bins_on_top() -> Result<()> {
        let mut fig = Figure::new(&small_config());
        fig.draw_spectrogram(&ramp(16, 40), "Mel Spectrogram: ramp.wav")?;
        let plot = fig.plot_area();
        assert_eq!(fig.pixel(plot.x + 1, plot.y + 1), Colormap::Inferno.map(1.0));
        assert_eq!(
            fig.pixel(plot.x + 1, plot.bottom() - 2),
            Colormap::Inferno.map(0.0)
        );
        Ok(())
    }

    #[test]
    fn saved_figure_is_cropped_and_readable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ramp.png");
        let mut fig = Figure::new(&small_config());
        fig.draw_spectrogram(&ramp(16, 40), "Mel Spectrogram: ramp.wav")?;
        fig.save(&path)?;

        let img = image::open(&path)?;
        assert!(img.width() > 0 && img.width() < 500);
        assert!(img.height() > 0 && img.height() <= 200);
        Ok(())
    }

    #[test]
    fn constant_matrix_draws_lowest_color() -> Result<()> {
        let axes = SpectrogramAxes {
            sample_rate: 16000,
            hop_length: 512,
            fmin: 0.0,
            fmax: 8000.0,
        };
        let db = SpectrogramMatrix::new(8, 3, axes);
        let mut fig = Figure::new(&small_config());
        fig.draw_spectrogram(&db, "flat")?;
        let plot = fig.plot_area();
        assert_eq!(fig.pixel(plot.x + 5, plot.y + 5), Colormap::Inferno.map(0.0));
        Ok(())
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let axes = SpectrogramAxes {
            sample_rate: 16000,
            hop_length: 512,
            fmin: 0.0,
            fmax: 8000.0,
        };
        let db = SpectrogramMatrix::new(8, 0, axes);
        let mut fig = Figure::new(&small_config());
        assert!(fig.draw_spectrogram(&db, "empty").is_err());
    }
}

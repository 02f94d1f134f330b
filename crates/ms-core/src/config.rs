use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Colormap;
use crate::error::CoreError;

/// Configuration complète de melscope.
///
/// Sérialisable en TOML. Chaque section et chaque champ a une valeur par
/// défaut saine : un fichier vide est une configuration valide.
///
/// # Example
/// ```
/// use ms_core::config::MelscopeConfig;
/// let config = MelscopeConfig::default();
/// assert_eq!(config.spectrogram.n_fft, 2048);
/// assert_eq!(config.batch.audio_extension, "mp3");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MelscopeConfig {
    /// Mel spectrogram analysis parameters.
    pub spectrogram: SpectrogramConfig,
    /// Figure layout and output resolution.
    pub render: RenderConfig,
    /// Image discovery and SSIM parameters.
    pub similarity: SimilarityConfig,
    /// Directory layout and file naming for the batch drivers.
    pub batch: BatchConfig,
}

/// STFT + mel filterbank parameters.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// FFT window length in samples.
    pub n_fft: usize,
    /// Samples between successive frames.
    pub hop_length: usize,
    /// Number of mel bands.
    pub n_mels: usize,
    /// Lowest filterbank frequency in Hz.
    pub fmin: f32,
    /// Highest filterbank frequency in Hz. None = Nyquist.
    pub fmax: Option<f32>,
    /// Dynamic range floor below the peak, in dB. Negative = unbounded.
    pub top_db: f32,
    /// Power floor applied before the logarithm.
    pub amin: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            fmin: 0.0,
            fmax: None,
            top_db: 80.0,
            amin: 1e-10,
        }
    }
}

/// Figure geometry, expressed the way a plotting library would.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Figure width in inches.
    pub width_in: f32,
    /// Figure height in inches.
    pub height_in: f32,
    /// Pixels per inch.
    pub dpi: u32,
    /// Padding kept around the tight bounding box, in inches.
    pub pad_inches: f32,
    /// Heatmap color scale.
    pub colormap: Colormap,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 4.0,
            dpi: 300,
            pad_inches: 0.1,
            colormap: Colormap::Inferno,
        }
    }
}

impl RenderConfig {
    /// Convert a length in typographic points to pixels at the configured DPI.
    ///
    /// # Example
    /// ```
    /// use ms_core::config::RenderConfig;
    /// let render = RenderConfig::default();
    /// assert!((render.points_to_px(72.0) - 300.0).abs() < 1e-3);
    /// ```
    #[must_use]
    pub fn points_to_px(&self, points: f32) -> f32 {
        points / 72.0 * self.dpi as f32
    }

    /// Canvas size in pixels before cropping.
    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        let w = (self.width_in * self.dpi as f32).round() as u32;
        let h = (self.height_in * self.dpi as f32).round() as u32;
        (w.max(1), h.max(1))
    }
}

/// Image discovery and structural similarity parameters.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Extensions considered images, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Side of the square SSIM window. Must be odd.
    pub win_size: usize,
    /// Luminance stabilisation constant.
    pub k1: f64,
    /// Contrast stabilisation constant.
    pub k2: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            win_size: 7,
            k1: 0.01,
            k2: 0.03,
        }
    }
}

/// Batch directories and naming.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory scanned for audio files.
    pub input_dir: PathBuf,
    /// Directory receiving spectrograms; also the default similarity target.
    pub output_dir: PathBuf,
    /// Audio extension without the dot.
    pub audio_extension: String,
    /// Extension given to rendered spectrograms.
    pub image_extension: String,
    /// Ordre de traitement des fichiers découverts.
    pub order: DiscoveryOrder,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            audio_extension: "mp3".into(),
            image_extension: "png".into(),
            order: DiscoveryOrder::Lexicographic,
        }
    }
}

/// How discovered files are ordered before processing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryOrder {
    /// Sort by full path, byte-wise. Reproducible across platforms.
    #[default]
    Lexicographic,
    /// Keep whatever order the directory listing returned.
    Filesystem,
}

impl DiscoveryOrder {
    /// Apply the policy in place.
    ///
    /// # Example
    /// ```
    /// use ms_core::config::DiscoveryOrder;
    /// use std::path::PathBuf;
    /// let mut files = vec![PathBuf::from("b.png"), PathBuf::from("a.png")];
    /// DiscoveryOrder::Lexicographic.apply(&mut files);
    /// assert_eq!(files[0], PathBuf::from("a.png"));
    /// ```
    pub fn apply(self, paths: &mut [PathBuf]) {
        match self {
            Self::Lexicographic => paths.sort(),
            Self::Filesystem => {}
        }
    }
}

impl MelscopeConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        let s = &mut self.spectrogram;
        s.n_fft = s.n_fft.clamp(16, 1 << 16);
        s.hop_length = s.hop_length.clamp(1, s.n_fft);
        s.n_mels = s.n_mels.clamp(1, 512);
        s.fmin = s.fmin.max(0.0);
        s.amin = s.amin.max(f32::MIN_POSITIVE);

        let r = &mut self.render;
        r.width_in = r.width_in.clamp(1.0, 100.0);
        r.height_in = r.height_in.clamp(1.0, 100.0);
        r.dpi = r.dpi.clamp(50, 1200);
        r.pad_inches = r.pad_inches.clamp(0.0, 2.0);

        let sim = &mut self.similarity;
        sim.win_size = sim.win_size.clamp(3, 63);
        if sim.win_size.is_multiple_of(2) {
            sim.win_size += 1;
        }
        sim.k1 = sim.k1.clamp(1e-6, 1.0);
        sim.k2 = sim.k2.clamp(1e-6, 1.0);
        for ext in &mut sim.extensions {
            *ext = normalize_extension(ext);
        }

        let b = &mut self.batch;
        b.audio_extension = normalize_extension(&b.audio_extension);
        b.image_extension = normalize_extension(&b.image_extension);
    }

    /// Reject configurations that clamping cannot repair.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] on an unusable value.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.batch.audio_extension.is_empty() {
            return Err(CoreError::Config("batch.audio_extension is empty".into()));
        }
        if self.batch.image_extension.is_empty() {
            return Err(CoreError::Config("batch.image_extension is empty".into()));
        }
        if self.similarity.extensions.iter().all(String::is_empty) {
            return Err(CoreError::Config("similarity.extensions is empty".into()));
        }
        if let Some(fmax) = self.spectrogram.fmax
            && fmax <= self.spectrogram.fmin
        {
            return Err(CoreError::Config(format!(
                "spectrogram.fmax ({fmax}) must exceed fmin ({})",
                self.spectrogram.fmin
            )));
        }
        Ok(())
    }
}

/// Lower-case and strip a leading dot: `".MP3"` → `"mp3"`.
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or validated.
///
/// # Example
/// ```no_run
/// use ms_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("melscope.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<MelscopeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let mut config: MelscopeConfig = toml::from_str(&content)
        .with_context(|| format!("Cannot parse {}", path.display()))?;
    config.clamp_all();
    config.validate()?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() -> Result<()> {
        let mut config: MelscopeConfig = toml::from_str(
            r#"
            [spectrogram]
            n_mels = 64

            [batch]
            audio_extension = ".WAV"
            order = "filesystem"
            "#,
        )?;
        config.clamp_all();
        assert_eq!(config.spectrogram.n_mels, 64);
        assert_eq!(config.spectrogram.hop_length, 512);
        assert_eq!(config.batch.audio_extension, "wav");
        assert_eq!(config.batch.order, DiscoveryOrder::Filesystem);
        assert_eq!(config.render.colormap, Colormap::Inferno);
        Ok(())
    }

    #[test]
    fn even_window_is_made_odd() {
        let mut config = MelscopeConfig::default();
        config.similarity.win_size = 8;
        config.clamp_all();
        assert_eq!(config.similarity.win_size, 9);
    }

    #[test]
    fn fmax_below_fmin_is_rejected() {
        let mut config = MelscopeConfig::default();
        config.spectrogram.fmin = 500.0;
        config.spectrogram.fmax = Some(100.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_reads_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("melscope.toml");
        std::fs::write(&path, "[render]\ndpi = 100\ncolormap = \"magma\"\n")?;
        let config = load_config(&path)?;
        assert_eq!(config.render.dpi, 100);
        assert_eq!(config.render.colormap, Colormap::Magma);
        assert_eq!(config.render.canvas_size(), (1000, 400));
        Ok(())
    }

    #[test]
    fn load_config_missing_file_errors() {
        assert!(load_config(Path::new("/definitely/not/here.toml")).is_err());
    }
}

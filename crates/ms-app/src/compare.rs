use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ms_core::config::{DiscoveryOrder, SimilarityConfig};
use ms_core::frame::GrayFrame;
use ms_image::folder::discover_images;
use ms_image::image::load_grayscale;
use ms_image::resize::Resizer;
use ms_image::ssim::structural_similarity;

/// Résultat de la comparaison d'une paire d'images voisines.
#[derive(Debug)]
pub enum PairOutcome {
    Scored {
        first: PathBuf,
        second: PathBuf,
        /// SSIM × 100.
        percent: f64,
    },
    /// One side could not be loaded. `missing` lists the sides that did not exist.
    Skipped {
        first: PathBuf,
        second: PathBuf,
        missing: Vec<PathBuf>,
    },
    /// Both loaded but the metric rejected them (e.g. smaller than the window).
    Failed {
        first: PathBuf,
        second: PathBuf,
        error: anyhow::Error,
    },
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored {
                first,
                second,
                percent,
            } => write!(
                f,
                "Similarity between '{}' and '{}': {percent:.2}%",
                base_name(first),
                base_name(second)
            ),
            Self::Skipped {
                first,
                second,
                missing,
            } => {
                for path in missing {
                    writeln!(f, "Error: File '{}' not found.", path.display())?;
                }
                write!(
                    f,
                    "Skipping comparison: '{}' or '{}' could not be loaded.",
                    first.display(),
                    second.display()
                )
            }
            Self::Failed {
                first,
                second,
                error,
            } => write!(
                f,
                "Error comparing '{}' and '{}': {error:#}",
                base_name(first),
                base_name(second)
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ScanSummary {
    /// Number of pair outcomes produced.
    #[must_use]
    pub fn total(&self) -> usize {
        self.scored + self.skipped + self.failed
    }
}

/// Images découvertes, prêtes à être comparées (ou pas).
#[derive(Debug, PartialEq, Eq)]
pub enum SimilarityScan {
    /// Fewer than two images; no comparison is possible.
    Insufficient { found: usize },
    Ready(Vec<PathBuf>),
}

impl SimilarityScan {
    /// List the candidate images of `dir`.
    ///
    /// # Errors
    /// Returns an error if `dir` cannot be read.
    pub fn discover(dir: &Path, config: &SimilarityConfig, order: DiscoveryOrder) -> Result<Self> {
        let files = discover_images(dir, &config.extensions, order)?;
        Ok(if files.len() < 2 {
            Self::Insufficient { found: files.len() }
        } else {
            Self::Ready(files)
        })
    }
}

/// Compare chaque image à sa voisine : `files[i]` contre `files[i + 1]`.
///
/// Yields exactly `files.len() - 1` outcomes (none for fewer than two files),
/// each handed to `on_pair` as soon as it is known.
pub fn compare_adjacent(
    files: &[PathBuf],
    config: &SimilarityConfig,
    mut on_pair: impl FnMut(&PairOutcome),
) -> ScanSummary {
    let mut resizer = Resizer::new();
    let mut summary = ScanSummary::default();
    for pair in files.windows(2) {
        let outcome = compare_pair(&pair[0], &pair[1], config, &mut resizer);
        match outcome {
            PairOutcome::Scored { .. } => summary.scored += 1,
            PairOutcome::Skipped { .. } => summary.skipped += 1,
            PairOutcome::Failed { .. } => summary.failed += 1,
        }
        on_pair(&outcome);
    }
    summary
}

/// Score one pair. The second image is resampled to the first one's shape
/// when they differ; files on disk are never modified.
pub fn compare_pair(
    first: &Path,
    second: &Path,
    config: &SimilarityConfig,
    resizer: &mut Resizer,
) -> PairOutcome {
    let mut missing = Vec::new();
    let a = load_side(first, &mut missing);
    let b = load_side(second, &mut missing);
    let (Some(a), Some(b)) = (a, b) else {
        return PairOutcome::Skipped {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            missing,
        };
    };

    match score(&a, &b, config, resizer) {
        Ok(ssim) => PairOutcome::Scored {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            percent: ssim * 100.0,
        },
        Err(error) => PairOutcome::Failed {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            error,
        },
    }
}

fn load_side(path: &Path, missing: &mut Vec<PathBuf>) -> Option<GrayFrame> {
    match load_grayscale(path) {
        Ok(Some(frame)) => Some(frame),
        Ok(None) => {
            missing.push(path.to_path_buf());
            None
        }
        Err(e) => {
            log::warn!("{e:#}");
            None
        }
    }
}

fn score(
    a: &GrayFrame,
    b: &GrayFrame,
    config: &SimilarityConfig,
    resizer: &mut Resizer,
) -> Result<f64> {
    if a.shape() == b.shape() {
        return Ok(structural_similarity(a, b, config)?);
    }
    log::debug!(
        "Resizing {}x{} to {}x{} for comparison",
        b.width,
        b.height,
        a.width,
        a.height
    );
    let b = resizer.resize(b, a.width, a.height)?;
    Ok(structural_similarity(a, &b, config)?)
}

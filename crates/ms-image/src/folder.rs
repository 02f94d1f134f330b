use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ms_core::config::DiscoveryOrder;

/// Liste les images d'un dossier (non récursif).
///
/// A regular file qualifies when its extension, lower-cased, is one of
/// `extensions` (expected lower-case, without the dot). The result is ordered
/// by `order`.
///
/// # Errors
/// Returns an error if the directory cannot be read.
///
/// # Example
/// ```no_run
/// use ms_core::config::DiscoveryOrder;
/// use ms_image::folder::discover_images;
/// use std::path::Path;
/// let exts = vec!["png".to_string(), "jpg".to_string()];
/// let files = discover_images(Path::new("output"), &exts, DiscoveryOrder::Lexicographic).unwrap();
/// ```
pub fn discover_images(
    dir: &Path,
    extensions: &[String],
    order: DiscoveryOrder,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Cannot read directory {}", dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension() else {
            continue;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        if extensions.iter().any(|e| *e == ext) {
            files.push(path);
        }
    }
    order.apply(&mut files);
    log::debug!("Discovered {} image(s) in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["png".into(), "jpg".into(), "jpeg".into()]
    }

    #[test]
    fn matches_extensions_case_insensitively() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["b.PNG", "a.jpeg", "c.JpG", "notes.txt", "noext"] {
            fs::write(dir.path().join(name), b"x")?;
        }
        fs::create_dir(dir.path().join("nested.png"))?;

        let files = discover_images(dir.path(), &exts(), DiscoveryOrder::Lexicographic)?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["a.jpeg", "b.PNG", "c.JpG"]);
        Ok(())
    }

    #[test]
    fn does_not_recurse() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub").join("deep.png"), b"x")?;
        let files = discover_images(dir.path(), &exts(), DiscoveryOrder::Filesystem)?;
        assert!(files.is_empty());
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_kept() -> Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir()?;
        let name = OsStr::from_bytes(b"shot\xff.PNG");
        fs::write(dir.path().join(name), b"x")?;
        let files = discover_images(dir.path(), &exts(), DiscoveryOrder::Lexicographic)?;
        assert_eq!(files, [dir.path().join(name)]);
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(
            discover_images(Path::new("/no/such/dir"), &exts(), DiscoveryOrder::default())
                .is_err()
        );
    }
}

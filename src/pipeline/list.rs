//! Directory listing: discover the input files of a batch.
//!
//! Reads the source directory in one pass, drops anything that is not a
//! regular file and any name that does not end with the input extension, and
//! returns the survivors
//! sorted by name so two runs over the same directory visit files in the
//! same order.

use crate::error::H2mError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One discovered input file.
///
/// Always a regular file: directories and special files never become entries,
/// so there is no directory flag to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// File name without directory, e.g. `index.html`.
    pub name: String,
    /// `name` with the input extension removed, e.g. `index`. Never empty.
    pub stem: String,
    /// Full path (source directory + name).
    pub path: PathBuf,
}

/// Listing result: convertible entries plus a count of ignored ones.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<SourceEntry>,
    pub skipped: usize,
}

/// Stem of `name` for `extension`, or `None` when the name does not carry
/// the extension or nothing is left once it is removed.
pub fn stem_of<'a>(name: &'a str, extension: &str) -> Option<&'a str> {
    name.strip_suffix(extension).filter(|stem| !stem.is_empty())
}

/// List convertible files in `source_dir`.
///
/// # Errors
/// [`H2mError::DirectoryAccess`] when the directory is missing, is not a
/// directory, or cannot be read.
pub async fn list_sources(source_dir: &Path, extension: &str) -> Result<Listing, H2mError> {
    let access = |reason: String| H2mError::DirectoryAccess {
        path: source_dir.to_path_buf(),
        reason,
    };

    let meta = tokio::fs::metadata(source_dir)
        .await
        .map_err(|e| access(e.to_string()))?;
    if !meta.is_dir() {
        return Err(access("not a directory".to_string()));
    }

    let mut dir = tokio::fs::read_dir(source_dir)
        .await
        .map_err(|e| access(e.to_string()))?;

    let mut listing = Listing::default();
    while let Some(entry) = dir.next_entry().await.map_err(|e| access(e.to_string()))? {
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!("Skipping non-UTF-8 name: {}", path.display());
            listing.skipped += 1;
            continue;
        };

        if !is_regular_file(&path).await {
            debug!("Skipping {}: not a regular file", name);
            listing.skipped += 1;
            continue;
        }

        match stem_of(&name, extension) {
            Some(stem) => {
                let stem = stem.to_string();
                listing.entries.push(SourceEntry { name, stem, path });
            }
            None => {
                debug!("Skipping {}: no {} extension", name, extension);
                listing.skipped += 1;
            }
        }
    }

    listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        "Listed {} files ({} skipped) in {}",
        listing.entries.len(),
        listing.skipped,
        source_dir.display()
    );
    Ok(listing)
}

/// Symlinks are followed. Directories, FIFOs, sockets, devices and dangling
/// links are all rejected; reading a FIFO would block until a writer appears.
pub(crate) async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stem_requires_exact_suffix() {
        assert_eq!(stem_of("page.html", ".html"), Some("page"));
        assert_eq!(stem_of("a.b.html", ".html"), Some("a.b"));
        assert_eq!(stem_of("page.HTML", ".html"), None);
        assert_eq!(stem_of("page.htm", ".html"), None);
        assert_eq!(stem_of("notes.txt", ".html"), None);
    }

    #[test]
    fn short_names_do_not_panic() {
        assert_eq!(stem_of("", ".html"), None);
        assert_eq!(stem_of("a", ".html"), None);
        assert_eq!(stem_of(".html", ".html"), None);
    }

    #[tokio::test]
    async fn lists_only_matching_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.html"), "<p>b</p>").unwrap();
        std::fs::write(dir.path().join("a.html"), "<p>a</p>").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested.html")).unwrap();

        let listing = list_sources(dir.path(), ".html").await.unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.html", "b.html"]);
        assert_eq!(listing.entries[0].stem, "a");
        assert_eq!(listing.entries[0].path, dir.path().join("a.html"));
        assert_eq!(listing.skipped, 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn special_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("real.html"), "<p>ok</p>").unwrap();
        let status = std::process::Command::new("mkfifo")
            .arg(dir.path().join("pipe.html"))
            .status()
            .unwrap();
        assert!(status.success());
        std::os::unix::fs::symlink(dir.path().join("gone.html"), dir.path().join("dangling.html"))
            .unwrap();

        let listing = list_sources(dir.path(), ".html").await.unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["real.html"]);
        assert_eq!(listing.skipped, 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_to_file_is_listed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("target.txt"), "<p>t</p>").unwrap();
        std::os::unix::fs::symlink(dir.path().join("target.txt"), dir.path().join("link.html"))
            .unwrap();

        let listing = list_sources(dir.path(), ".html").await.unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].stem, "link");
        assert_eq!(listing.skipped, 1);
    }

    #[tokio::test]
    async fn empty_directory_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let listing = list_sources(dir.path(), ".html").await.unwrap();
        assert!(listing.entries.is_empty());
        assert_eq!(listing.skipped, 0);
    }

    #[tokio::test]
    async fn missing_directory_is_access_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = list_sources(&missing, ".html").await.unwrap_err();
        assert!(matches!(err, H2mError::DirectoryAccess { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn file_instead_of_directory_is_access_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("page.html");
        std::fs::write(&file, "x").unwrap();
        let err = list_sources(&file, ".html").await.unwrap_err();
        match err {
            H2mError::DirectoryAccess { reason, .. } => assert_eq!(reason, "not a directory"),
            other => panic!("expected DirectoryAccess, got {other:?}"),
        }
    }
}

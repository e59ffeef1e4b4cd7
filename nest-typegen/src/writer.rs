//! Output of the generated declaration file.
//!
//! The artifact is replaced in one step at the end of a successful run:
//! content goes to a sibling temporary file which is then renamed over the
//! target. Dry-run mode hands the content back instead.

use crate::error::{GenResult, WriteError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of writing the artifact.
#[derive(Debug)]
pub enum WriteResult {
    /// The file was replaced.
    Written {
        /// Target path.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// The file already held exactly this content.
    Unchanged {
        /// Target path.
        path: PathBuf,
    },
    /// Dry run; nothing touched the disk.
    DryRun {
        /// Content that would have been written.
        content: String,
        /// Target path.
        path: PathBuf,
    },
}

impl WriteResult {
    /// Target path of the write.
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::Unchanged { path } | Self::DryRun { path, .. } => {
                path
            }
        }
    }

    /// Whether new content reached the disk.
    pub fn was_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }

    /// Bytes written; zero unless the file was replaced.
    pub fn bytes(&self) -> usize {
        match self {
            Self::Written { bytes, .. } => *bytes,
            _ => 0,
        }
    }
}

/// Writes the declaration artifact.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    /// Create a writer; a dry-run writer never touches the disk.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Replace `path` with `content`.
    pub fn write(&self, path: &Path, content: &str) -> GenResult<WriteResult> {
        if self.dry_run {
            debug!(path = %path.display(), "dry run, skipping write");
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path: path.to_path_buf(),
            });
        }

        if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
            debug!(path = %path.display(), "output unchanged");
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let staging = staging_path(path);
        std::fs::write(&staging, content).map_err(|e| WriteError::WriteFile {
            path: staging.clone(),
            source: e,
        })?;

        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(WriteError::WriteFile {
                path: path.to_path_buf(),
                source: e,
            }
            .into());
        }

        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }
}

/// `dir/.name.tmp` next to the target.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| path.as_os_str()));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTENT: &str = "interface ping_response {\n\tTook: number;\n}\n";

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typedefinitions.ts");

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(result.was_written());
        assert_eq!(result.bytes(), CONTENT.len());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONTENT);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("generated/ts/typedefinitions.ts");

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(result.was_written());
        assert!(path.exists());
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typedefinitions.ts");

        match FileWriter::new(true).write(&path, CONTENT).unwrap() {
            WriteResult::DryRun { content, path: target } => {
                assert_eq!(content, CONTENT);
                assert_eq!(target, path);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_write_replaces_stale_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typedefinitions.ts");
        std::fs::write(&path, "stale").unwrap();

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(result.was_written());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONTENT);
    }

    #[test]
    fn test_identical_content_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typedefinitions.ts");
        std::fs::write(&path, CONTENT).unwrap();

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert!(!result.was_written());
        assert_eq!(result.bytes(), 0);
        assert_eq!(result.path(), path.as_path());
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("out/typedefinitions.ts")),
            PathBuf::from("out/.typedefinitions.ts.tmp")
        );
    }
}

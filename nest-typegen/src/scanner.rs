//! Source file scanner for discovering type declarations.
//!
//! This module walks the client source tree and records, for every source
//! file, the namespace it declares and the top-level type names inside it.

use crate::declarations::DeclarationParser;
use crate::error::{GenResult, ScanError};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Declarations found in one scanned source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDeclaration {
    /// Absolute path to the file.
    pub file_path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// Namespace owning every type in the file.
    pub owning_namespace: String,

    /// Top-level type names declared in the file.
    pub declared_type_names: Vec<String>,
}

/// Scanner for discovering declaration source files.
#[derive(Debug)]
pub struct SourceScanner {
    /// Root directory to scan.
    root: PathBuf,

    /// Source file extension, without the dot.
    extension: String,

    /// Immediate parent folder names whose files are skipped.
    skip_folders: HashSet<String>,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,
}

impl SourceScanner {
    /// Create a new scanner for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "cs".to_string(),
            skip_folders: HashSet::new(),
            respect_gitignore: false,
        }
    }

    /// Set the source file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Skip files whose immediate parent folder has one of these names.
    pub fn with_skip_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_folders = folders.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Scan the directory and return the declarations of every source file.
    ///
    /// Results are ordered by path so that repeated runs see the same
    /// first writer for every symbol.
    pub fn scan(&self) -> GenResult<Vec<SourceDeclaration>> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let parser = DeclarationParser::new()
            .map_err(|e| ScanError::invalid_pattern("declaration", e.to_string()))?;

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(self.respect_gitignore)
            .hidden(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let mut declarations = Vec::new();

        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() || !self.is_source_file(path) || self.is_skipped(path) {
                continue;
            }

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(file = %path.display(), "skipping source file that is not valid UTF-8");
                    continue;
                }
                Err(e) => {
                    return Err(ScanError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    }
                    .into())
                }
            };

            let parsed = parser.parse(&content);
            let relative_path = self.relative_path(path);
            debug!(
                file = %relative_path.display(),
                namespace = %parsed.namespace,
                types = parsed.type_names.len(),
                "scanned source file"
            );

            declarations.push(SourceDeclaration {
                file_path: path.to_path_buf(),
                relative_path,
                owning_namespace: parsed.namespace,
                declared_type_names: parsed.type_names,
            });
        }

        info!(
            root = %self.root.display(),
            files = declarations.len(),
            "source scan complete"
        );

        Ok(declarations)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy() == self.extension)
    }

    /// Only the immediate parent folder is checked; deeper ancestors are not.
    fn is_skipped(&self, path: &Path) -> bool {
        path.parent()
            .and_then(Path::file_name)
            .is_some_and(|name| self.skip_folders.contains(name.to_string_lossy().as_ref()))
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

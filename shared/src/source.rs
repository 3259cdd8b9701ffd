//! Where markdown files come from.
//!
//! [`FsSource`] reads a directory tree with `tokio::fs`; [`MemorySource`]
//! holds files in memory so repository behaviour can be tested without
//! touching disk.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ContentError;

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Read access to a tree of markdown files.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Markdown files directly inside `dir`, sorted by file name.
    ///
    /// A missing directory is reported as [`ContentError::MissingDirectory`].
    async fn list_markdown(&self, dir: &Path) -> Result<Vec<PathBuf>, ContentError>;

    /// Whole file as UTF-8 text.
    async fn read_to_string(&self, path: &Path) -> Result<String, ContentError>;

    /// Last modification date, when the source knows it.
    async fn modified(&self, path: &Path) -> Option<NaiveDate>;
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Filesystem backed source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[async_trait::async_trait]
impl ContentSource for FsSource {
    async fn list_markdown(&self, dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::MissingDirectory(dir.to_path_buf()));
            },
            Err(err) => return Err(ContentError::io(dir, err)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| ContentError::io(dir, err))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if is_file && is_markdown(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String, ContentError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|err| ContentError::io(path, err))
    }

    async fn modified(&self, path: &Path) -> Option<NaiveDate> {
        let metadata = tokio::fs::metadata(path).await.ok()?;
        let modified = metadata.modified().ok()?;
        Some(DateTime::<Utc>::from(modified).date_naive())
    }
}

#[derive(Debug, Clone)]
enum MemoryFile {
    Text {
        contents: String,
        modified: Option<NaiveDate>,
    },
    Unreadable,
}

/// In-memory source keyed by full path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, MemoryFile>,
    dirs: BTreeSet<PathBuf>,
    unreadable_dirs: BTreeSet<PathBuf>,
}

impl MemorySource {
    /// Empty source with no directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; its parent directory comes into existence with it.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path.into(), MemoryFile::Text {
            contents: contents.into(),
            modified: None,
        });
        self
    }

    /// Add a file with a known modification date.
    pub fn with_modified_file(
        mut self,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
        modified: NaiveDate,
    ) -> Self {
        self.insert(path.into(), MemoryFile::Text {
            contents: contents.into(),
            modified: Some(modified),
        });
        self
    }

    /// Add a file that is listed but fails to read.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), MemoryFile::Unreadable);
        self
    }

    /// Add an empty directory.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    /// Add a directory that exists but cannot be listed.
    pub fn with_unreadable_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.dirs.insert(path.clone());
        self.unreadable_dirs.insert(path);
        self
    }

    fn insert(&mut self, path: PathBuf, file: MemoryFile) {
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
        self.files.insert(path, file);
    }
}

#[async_trait::async_trait]
impl ContentSource for MemorySource {
    async fn list_markdown(&self, dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
        if !self.dirs.contains(dir) {
            return Err(ContentError::MissingDirectory(dir.to_path_buf()));
        }
        if self.unreadable_dirs.contains(dir) {
            return Err(ContentError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }
        let mut files: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir) && is_markdown(path))
            .cloned()
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String, ContentError> {
        match self.files.get(path) {
            Some(MemoryFile::Text {
                contents, ..
            }) => Ok(contents.clone()),
            Some(MemoryFile::Unreadable) => Err(ContentError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "stream did not contain valid UTF-8",
                ),
            }),
            None => Err(ContentError::NotFound(path.to_path_buf())),
        }
    }

    async fn modified(&self, path: &Path) -> Option<NaiveDate> {
        match self.files.get(path)? {
            MemoryFile::Text {
                modified, ..
            } => *modified,
            MemoryFile::Unreadable => None,
        }
    }
}

//! Splicing generated artifacts into existing source files
//!
//! A [`PatchTarget`] holds one file's text in memory. The model and controller
//! patchers edit that text through [`anchor::Anchor`] lookups, and the file is
//! written back once, after every edit has been applied.

pub mod anchor;
pub mod controller;
pub mod model;

use crate::error::{MkApiError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub use anchor::Anchor;
pub use controller::{apply_controller, inject_middleware};
pub use model::apply_model_schema;

/// Mode flags for one patch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Replace generated content that is already present
    pub force: bool,
    /// Also replace stub bodies with CRUD implementations
    pub code: bool,
}

/// Result of patching one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The file was already annotated and left alone
    Skipped,
    /// The file was written back
    Written {
        /// Whether the written text differs from what was read
        changed: bool,
    },
}

/// A source file loaded for patching
#[derive(Debug, Clone)]
pub struct PatchTarget {
    path: PathBuf,
    original: String,
    content: String,
}

impl PatchTarget {
    /// Read the file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`MkApiError::TargetNotFound`] if the file does not exist, or
    /// [`MkApiError::Io`] if it cannot be read
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MkApiError::TargetNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Ok(Self::from_text(path, content))
    }

    /// Target backed by in-memory text
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            original: content.clone(),
            content,
        }
    }

    /// File path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current text
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Mutable access to the current text
    pub fn content_mut(&mut self) -> &mut String {
        &mut self.content
    }

    /// Whether the text differs from what was read
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.content != self.original
    }

    /// Write the current text back to disk
    ///
    /// # Errors
    ///
    /// Returns [`MkApiError::Io`] if the file cannot be written
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.content)?;
        tracing::debug!(path = %self.path.display(), bytes = self.content.len(), "Wrote target");
        Ok(())
    }

    pub(crate) fn anchor_missing(&self, anchor: &Anchor) -> MkApiError {
        MkApiError::AnchorNotFound {
            anchor: anchor.name().to_string(),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Post.php");

        let err = PatchTarget::load(&path).unwrap_err();
        assert!(matches!(err, MkApiError::TargetNotFound { path: ref p } if *p == path));
    }

    #[test]
    fn test_load_edit_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Post.php");
        fs::write(&path, "<?php\n").unwrap();

        let mut target = PatchTarget::load(&path).unwrap();
        assert!(!target.is_changed());

        target.content_mut().push_str("class Post {}\n");
        assert!(target.is_changed());
        target.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\nclass Post {}\n");
    }

    #[test]
    fn test_directory_is_not_a_target() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PatchTarget::load(dir.path()),
            Err(MkApiError::TargetNotFound { .. })
        ));
    }
}

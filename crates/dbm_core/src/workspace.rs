//! Scratch workspace for intermediate artifacts.
//!
//! One workspace per run. Removal is guaranteed on every exit path:
//! the directory is owned by a [`tempfile::TempDir`], whose Drop removes
//! it during unwinding or early return. The workspace never interprets
//! artifact semantics; it only owns the container.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::errors::{PipelineError, Result};

/// Ephemeral directory holding all intermediate artifacts for one run.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh scratch directory.
    pub fn create() -> Result<Self> {
        let dir = TempDir::new()
            .map_err(|e| PipelineError::io("creating scratch directory", e))?;
        tracing::debug!("workspace: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// All non-directory entries in the workspace (files and symlinks),
    /// sorted by name.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(self.path())
            .map_err(|e| PipelineError::io("listing scratch directory", e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| PipelineError::io("listing scratch directory", e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| PipelineError::io("listing scratch directory", e))?;
            if !file_type.is_dir() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Remove the scratch directory, surfacing any removal error.
    ///
    /// Dropping the workspace also removes it; `close` exists so the happy
    /// path can report a failed cleanup instead of ignoring it.
    pub fn close(self) -> Result<()> {
        self.dir
            .close()
            .map_err(|e| PipelineError::io("removing scratch directory", e))
    }
}

//! Staging of workspace artifacts into the output directory.
//!
//! The output subdirectory is named after the scan stem and lives under
//! the user-supplied output root. It is either newly created or, when
//! non-empty, requires explicit overwrite permission. Copies go through
//! the command runner (`cp -vfp`: verbose, force-overwriting,
//! metadata-preserving) so staging stays dry-run consistent.

use std::fs;
use std::path::{Path, PathBuf};

use super::artifacts::ArtifactMap;
use crate::config::SaveMode;
use crate::errors::{PipelineError, Result};
use crate::runner::CommandRunner;
use crate::workspace::Workspace;

/// Create or validate the output subdirectory for this run.
///
/// Missing: created with parents. Existing and non-empty without
/// overwrite permission: `OutputConflict`. Existing with permission:
/// file-level overwrite is allowed during copy.
pub fn prepare_output_dir(output_root: &Path, stem: &str, overwrite: bool) -> Result<PathBuf> {
    let out_dir = output_root.join(stem);
    if out_dir.exists() {
        let mut entries = fs::read_dir(&out_dir)
            .map_err(|e| PipelineError::io(format!("reading {}", out_dir.display()), e))?;
        if entries.next().is_some() && !overwrite {
            return Err(PipelineError::output_conflict(format!(
                "non-empty output directory {} already exists; use --overwrite to overwrite",
                out_dir.display()
            )));
        }
    } else {
        fs::create_dir_all(&out_dir)
            .map_err(|e| PipelineError::io(format!("creating {}", out_dir.display()), e))?;
    }
    Ok(out_dir)
}

/// Copy the selected artifacts into the output directory.
///
/// Save-all copies every file currently in the workspace; save-subset
/// copies the curated set. Returns the destination paths.
pub fn stage_outputs(
    runner: &mut CommandRunner,
    workspace: &Workspace,
    artifacts: &ArtifactMap,
    save_mode: SaveMode,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let sources: Vec<PathBuf> = match save_mode {
        SaveMode::All => workspace.list_files()?,
        SaveMode::Subset => artifacts
            .staging_subset()
            .iter()
            .map(|p| p.to_path_buf())
            .collect(),
    };

    let mut staged = Vec::with_capacity(sources.len());
    for source in &sources {
        runner.run(&[
            "cp".to_string(),
            "-vfp".to_string(),
            source.display().to_string(),
            out_dir.display().to_string(),
        ])?;
        if let Some(name) = source.file_name() {
            staged.push(out_dir.join(name));
        }
    }
    Ok(staged)
}

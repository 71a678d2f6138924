//! Pipeline driver: sequences the stage chain through the command runner.
//!
//! Control flow for one run: resolve inputs, open the scratch workspace,
//! prepare the output directory, run every stage in order, stage results
//! out, and remove the workspace. Removal happens on every exit path:
//! the workspace's Drop fires during early error returns, and the happy
//! path closes it explicitly to surface cleanup errors.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::artifacts::ArtifactMap;
use super::stages::{build_stage_plan, Stage};
use super::staging;
use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Result};
use crate::resolver::{self, ResolvedInputs};
use crate::runner::CommandRunner;
use crate::workspace::Workspace;

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: String,
    pub finished_at: String,
    /// Output subdirectory holding the staged artifacts.
    pub output_dir: PathBuf,
    /// Stage names, in completion order.
    pub stages_completed: Vec<String>,
    /// Destination paths of staged artifacts.
    pub staged_files: Vec<PathBuf>,
    /// Every assembled command line, in submission order.
    pub commands: Vec<String>,
}

/// Run the full pipeline for one scan.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let started_at = Local::now().to_rfc3339();
    tracing::info!("pipeline started at {}", started_at);

    let resolved = resolver::resolve(config)?;
    let workspace = Workspace::create()?;
    let mut runner = CommandRunner::new(config.dry_run, config.verbosity);

    let outcome = drive(config, &resolved, &workspace, &mut runner);
    if let Err(e) = workspace.close() {
        tracing::warn!("failed to remove scratch directory: {}", e);
    }
    let (output_dir, stages_completed, staged_files) = outcome?;

    let finished_at = Local::now().to_rfc3339();
    tracing::info!("pipeline finished at {}", finished_at);

    Ok(RunReport {
        started_at,
        finished_at,
        output_dir,
        stages_completed,
        staged_files,
        commands: runner.into_command_lines(),
    })
}

fn drive(
    config: &PipelineConfig,
    resolved: &ResolvedInputs,
    workspace: &Workspace,
    runner: &mut CommandRunner,
) -> Result<(PathBuf, Vec<String>, Vec<PathBuf>)> {
    let artifacts = ArtifactMap::derive(&resolved.materialized_name(), workspace.path());

    // Conflict policy applies before any stage runs, dry-run included,
    // so a dry run surfaces OutputConflict exactly like a real run.
    let out_dir =
        staging::prepare_output_dir(&resolved.output_root, &artifacts.stem, config.overwrite)?;

    let stages = build_stage_plan(resolved, &artifacts);
    if let Ok(json) = serde_json::to_string_pretty(&stages) {
        tracing::debug!("stage plan:\n{}", json);
    }
    let completed = run_stages(runner, &stages)?;

    list_dir(runner, workspace.path())?;
    let staged = staging::stage_outputs(runner, workspace, &artifacts, config.save_mode, &out_dir)?;
    list_dir(runner, &out_dir)?;

    Ok((out_dir, completed, staged))
}

/// Run the stage chain in order, aborting on the first failure.
///
/// In execute mode each stage's declared inputs must exist before its
/// command is spawned; a failed stage therefore stops every later one.
fn run_stages(runner: &mut CommandRunner, stages: &[Stage]) -> Result<Vec<String>> {
    let mut completed = Vec::with_capacity(stages.len());
    for stage in stages {
        tracing::info!("=== {} ===", stage.name);
        if !runner.is_dry_run() {
            for input in &stage.inputs {
                if !input.exists() {
                    return Err(PipelineError::missing_resource(format!(
                        "stage {} requires missing artifact: {}",
                        stage.name,
                        input.display()
                    )));
                }
            }
        }
        match &stage.stdout_to {
            Some(target) => runner.run_redirected(&stage.argv, target)?,
            None => runner.run(&stage.argv)?,
        }
        completed.push(stage.name.clone());
    }
    Ok(completed)
}

fn list_dir(runner: &mut CommandRunner, dir: &Path) -> Result<()> {
    runner.run(&[
        "ls".to_string(),
        "-lh".to_string(),
        dir.display().to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SaveMode;
    use std::fs;
    use tempfile::tempdir;

    /// Share dir with template model + mask and a BEaST library.
    fn fixture_share_dir() -> tempfile::TempDir {
        let share = tempdir().unwrap();
        let model_dir = share.path().join("icbm152_model_09c");
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(model_dir.join("mni_icbm152_t1_tal_nlin_sym_09c.mnc"), b"x").unwrap();
        fs::write(
            model_dir.join("mni_icbm152_t1_tal_nlin_sym_09c_mask.mnc"),
            b"x",
        )
        .unwrap();
        fs::create_dir_all(share.path().join("beast-library-1.1")).unwrap();
        share
    }

    fn fixture_config(
        scan: &Path,
        share: &Path,
        out_root: &Path,
        dry_run: bool,
    ) -> PipelineConfig {
        let mut config = PipelineConfig::new(
            scan.to_string_lossy().into_owned(),
            out_root.to_string_lossy().into_owned(),
        );
        config.share_dir = Some(share.to_string_lossy().into_owned());
        config.dry_run = dry_run;
        config.verbosity = 0;
        config
    }

    #[test]
    fn dry_run_plans_full_chain_without_executing() {
        let share = fixture_share_dir();
        let scans = tempdir().unwrap();
        let out_root = tempdir().unwrap();
        let scan = scans.path().join("scan001.nii.gz");
        fs::write(&scan, b"x").unwrap();

        let config = fixture_config(&scan, share.path(), out_root.path(), true);
        let report = run(&config).unwrap();

        assert_eq!(report.stages_completed.len(), 10);
        // save-all over an empty dry-run workspace: no cp commands, just
        // the ten stages plus the two directory listings
        assert_eq!(report.commands.len(), 12);
        let programs: Vec<&str> = report
            .commands
            .iter()
            .map(|c| c.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(
            programs,
            vec![
                "zcat",
                "nii2mnc",
                "mincnlm",
                "beast_normalize",
                "mincbeast",
                "minccalc",
                "nlfit_s",
                "pipeline_dbm.pl",
                "mincreshape",
                "mnc2nii",
                "ls",
                "ls",
            ]
        );
        // output subdir is created even in dry-run, named after the stem
        assert_eq!(report.output_dir, out_root.path().join("scan001"));
        assert!(report.output_dir.is_dir());
    }

    #[test]
    fn dry_run_subset_plans_five_copies() {
        let share = fixture_share_dir();
        let scans = tempdir().unwrap();
        let out_root = tempdir().unwrap();
        let scan = scans.path().join("scan001.nii.gz");
        fs::write(&scan, b"x").unwrap();

        let mut config = fixture_config(&scan, share.path(), out_root.path(), true);
        config.save_mode = SaveMode::Subset;
        let report = run(&config).unwrap();

        let cp_count = report
            .commands
            .iter()
            .filter(|c| c.starts_with("cp -vfp "))
            .count();
        assert_eq!(cp_count, 5);
    }

    #[test]
    fn uncompressed_scan_materializes_via_symlink() {
        let share = fixture_share_dir();
        let scans = tempdir().unwrap();
        let out_root = tempdir().unwrap();
        let scan = scans.path().join("scan001.nii");
        fs::write(&scan, b"x").unwrap();

        let config = fixture_config(&scan, share.path(), out_root.path(), true);
        let report = run(&config).unwrap();

        assert!(report.commands[0].starts_with("ln -s "));
        assert!(!report.commands.iter().any(|c| c.starts_with("zcat")));
    }

    #[test]
    fn output_conflict_surfaces_before_any_stage() {
        let share = fixture_share_dir();
        let scans = tempdir().unwrap();
        let out_root = tempdir().unwrap();
        let scan = scans.path().join("scan001.nii.gz");
        fs::write(&scan, b"x").unwrap();
        let pre_existing = out_root.path().join("scan001");
        fs::create_dir_all(&pre_existing).unwrap();
        fs::write(pre_existing.join("stray.txt"), b"x").unwrap();

        let config = fixture_config(&scan, share.path(), out_root.path(), true);
        let err = run(&config).unwrap_err();
        assert!(matches!(err, PipelineError::OutputConflict(_)));
    }

    #[test]
    fn overwrite_permits_pre_existing_output() {
        let share = fixture_share_dir();
        let scans = tempdir().unwrap();
        let out_root = tempdir().unwrap();
        let scan = scans.path().join("scan001.nii.gz");
        fs::write(&scan, b"x").unwrap();
        let pre_existing = out_root.path().join("scan001");
        fs::create_dir_all(&pre_existing).unwrap();
        fs::write(pre_existing.join("stray.txt"), b"x").unwrap();

        let mut config = fixture_config(&scan, share.path(), out_root.path(), true);
        config.overwrite = true;
        assert!(run(&config).is_ok());
    }

    #[test]
    fn execute_mode_aborts_on_missing_tool() {
        let share = fixture_share_dir();
        let scans = tempdir().unwrap();
        let out_root = tempdir().unwrap();
        let scan = scans.path().join("scan001.nii.gz");
        fs::write(&scan, b"x").unwrap();

        // zcat exists, but nii2mnc will not be installed in a test
        // environment; the chain must stop there with a command failure
        let config = fixture_config(&scan, share.path(), out_root.path(), false);
        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ExternalCommandFailure { .. } | PipelineError::MissingResource(_)
        ));
    }

    #[test]
    fn failed_stage_stops_later_stages() {
        let marker_dir = tempdir().unwrap();
        let marker = marker_dir.path().join("ran");
        let stages = vec![
            Stage {
                name: "First".to_string(),
                argv: vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()],
                stdout_to: None,
                inputs: vec![],
                outputs: vec![],
            },
            Stage {
                name: "Second".to_string(),
                argv: vec![
                    "touch".to_string(),
                    marker.to_string_lossy().into_owned(),
                ],
                stdout_to: None,
                inputs: vec![],
                outputs: vec![],
            },
        ];

        let mut runner = CommandRunner::new(false, 0);
        let err = run_stages(&mut runner, &stages).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!marker.exists());
        assert_eq!(runner.command_lines().len(), 1);
    }

    #[test]
    fn stage_with_missing_input_does_not_spawn() {
        let stages = vec![Stage {
            name: "Needs".to_string(),
            argv: vec!["sh".to_string(), "-c".to_string(), "exit 0".to_string()],
            stdout_to: None,
            inputs: vec![PathBuf::from("/nonexistent/artifact.mnc")],
            outputs: vec![],
        }];

        let mut runner = CommandRunner::new(false, 0);
        let err = run_stages(&mut runner, &stages).unwrap_err();
        assert!(matches!(err, PipelineError::MissingResource(_)));
        assert!(runner.command_lines().is_empty());
    }
}

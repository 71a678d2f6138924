//! The fixed stage chain, represented as data.
//!
//! Each stage is a declarative descriptor: the assembled command tokens,
//! an optional stdout redirect, and the artifact paths it consumes and
//! produces. The driver iterates the list in order; reordering or
//! inserting a stage is a data change here, not a control-flow rewrite.
//! Command assembly is therefore testable without executing anything.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::artifacts::ArtifactMap;
use crate::resolver::ResolvedInputs;

/// One planned external command in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name, used in logs and error context.
    pub name: String,
    /// Command tokens, fully assembled.
    pub argv: Vec<String>,
    /// Redirect target when the command's stdout is the artifact.
    pub stdout_to: Option<PathBuf>,
    /// Artifacts that must exist before this stage runs.
    pub inputs: Vec<PathBuf>,
    /// Artifacts this stage is documented to produce.
    pub outputs: Vec<PathBuf>,
}

impl Stage {
    fn new(name: &str, argv: Vec<String>, inputs: Vec<PathBuf>, outputs: Vec<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            argv,
            stdout_to: None,
            inputs,
            outputs,
        }
    }

    fn redirected(mut self, target: &Path) -> Self {
        self.stdout_to = Some(target.to_path_buf());
        self
    }
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

/// Build the ten-stage chain for one run.
///
/// Stage order is invariant. Gzipped scans are decompressed into the
/// workspace via `zcat` with redirected stdout; plain scans are
/// symlinked in, preserving the original extension.
pub fn build_stage_plan(inputs: &ResolvedInputs, artifacts: &ArtifactMap) -> Vec<Stage> {
    let materialize = if inputs.scan_is_gzipped {
        Stage::new(
            "Materialize",
            vec!["zcat".to_string(), arg(&inputs.scan)],
            vec![inputs.scan.clone()],
            vec![artifacts.raw_nifti.clone()],
        )
        .redirected(&artifacts.raw_nifti)
    } else {
        Stage::new(
            "Materialize",
            vec![
                "ln".to_string(),
                "-s".to_string(),
                arg(&inputs.scan),
                arg(&artifacts.raw_nifti),
            ],
            vec![inputs.scan.clone()],
            vec![artifacts.raw_nifti.clone()],
        )
    };

    vec![
        materialize,
        Stage::new(
            "Convert",
            vec![
                "nii2mnc".to_string(),
                arg(&artifacts.raw_nifti),
                arg(&artifacts.raw),
            ],
            vec![artifacts.raw_nifti.clone()],
            vec![artifacts.raw.clone()],
        ),
        Stage::new(
            "Denoise",
            vec![
                "mincnlm".to_string(),
                "-verbose".to_string(),
                arg(&artifacts.raw),
                arg(&artifacts.denoised),
            ],
            vec![artifacts.raw.clone()],
            vec![artifacts.denoised.clone()],
        ),
        Stage::new(
            "Normalize",
            vec![
                "beast_normalize".to_string(),
                "-modeldir".to_string(),
                arg(&inputs.template_dir),
                "-modelname".to_string(),
                inputs.template_name.clone(),
                arg(&artifacts.denoised),
                arg(&artifacts.norm),
                arg(&artifacts.norm_transform),
            ],
            vec![artifacts.denoised.clone()],
            vec![artifacts.norm.clone(), artifacts.norm_transform.clone()],
        ),
        Stage::new(
            "Segment",
            vec![
                "mincbeast".to_string(),
                "-fill".to_string(),
                "-median".to_string(),
                "-conf".to_string(),
                arg(&inputs.beast_conf),
                "-verbose".to_string(),
                arg(&inputs.beast_lib_dir),
                arg(&artifacts.norm),
                arg(&artifacts.mask),
            ],
            vec![artifacts.norm.clone()],
            vec![artifacts.mask.clone()],
        ),
        Stage::new(
            "Extract",
            vec![
                "minccalc".to_string(),
                "-verbose".to_string(),
                "-expression".to_string(),
                "A[0]*A[1]".to_string(),
                arg(&artifacts.norm),
                arg(&artifacts.mask),
                arg(&artifacts.extracted),
            ],
            vec![artifacts.norm.clone(), artifacts.mask.clone()],
            vec![artifacts.extracted.clone()],
        ),
        Stage::new(
            "Nonlinear",
            vec![
                "nlfit_s".to_string(),
                "-verbose".to_string(),
                "-source_mask".to_string(),
                arg(&artifacts.mask),
                "-target_mask".to_string(),
                arg(&inputs.template_mask),
                arg(&artifacts.extracted),
                arg(&inputs.template_volume),
                arg(&artifacts.nonlinear_transform),
                arg(&artifacts.nonlinear),
            ],
            vec![artifacts.extracted.clone(), artifacts.mask.clone()],
            vec![
                artifacts.nonlinear_transform.clone(),
                artifacts.nonlinear.clone(),
            ],
        ),
        Stage::new(
            "Dbm",
            vec![
                "pipeline_dbm.pl".to_string(),
                "-verbose".to_string(),
                "--model".to_string(),
                arg(&inputs.template_volume),
                arg(&artifacts.nonlinear_transform),
                arg(&artifacts.dbm),
            ],
            vec![artifacts.nonlinear_transform.clone()],
            vec![artifacts.dbm.clone()],
        ),
        // mincreshape fixes the orientation metadata pipeline_dbm.pl loses
        Stage::new(
            "Reshape",
            vec![
                "mincreshape".to_string(),
                "-dimorder".to_string(),
                "xspace,yspace,zspace".to_string(),
                arg(&artifacts.dbm),
                arg(&artifacts.dbm_reshaped),
            ],
            vec![artifacts.dbm.clone()],
            vec![artifacts.dbm_reshaped.clone()],
        ),
        Stage::new(
            "Export",
            vec![
                "mnc2nii".to_string(),
                "-nii".to_string(),
                arg(&artifacts.dbm_reshaped),
                arg(&artifacts.dbm_nifti),
            ],
            vec![artifacts.dbm_reshaped.clone()],
            vec![artifacts.dbm_nifti.clone()],
        ),
    ]
}

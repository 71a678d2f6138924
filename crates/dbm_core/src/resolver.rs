//! Path resolution and validation for pipeline inputs.
//!
//! Turns the raw strings in [`PipelineConfig`] into absolute, validated
//! paths before any external command runs. Each failure maps to one of
//! the typed error kinds so the caller can report it precisely.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{
    template_model_dir, PipelineConfig, DNAME_BEAST_LIB, KNOWN_TEMPLATES, SUFFIX_TEMPLATE_MASK,
};
use crate::errors::{PipelineError, Result};
use crate::paths::{self, EXT_MINC};

/// Fully resolved, validated filesystem inputs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedInputs {
    /// Absolute path to the source scan.
    pub scan: PathBuf,
    /// Whether the scan is gzip-compressed.
    pub scan_is_gzipped: bool,
    /// Absolute output root directory.
    pub output_root: PathBuf,
    /// Directory containing the anatomical template files.
    pub template_dir: PathBuf,
    /// Template identifier (file prefix inside `template_dir`).
    pub template_name: String,
    /// Template volume file.
    pub template_volume: PathBuf,
    /// Template companion brain-mask file.
    pub template_mask: PathBuf,
    /// BEaST library directory.
    pub beast_lib_dir: PathBuf,
    /// mincbeast configuration file inside the library directory.
    pub beast_conf: PathBuf,
}

/// Resolve and validate every path the pipeline needs.
///
/// Ordering contract: contradictory path options fail with
/// `ConfigurationError` before any filesystem check runs.
pub fn resolve(config: &PipelineConfig) -> Result<ResolvedInputs> {
    if config.share_dir.is_none()
        && (config.template_dir.is_none() || config.beast_lib_dir.is_none())
    {
        return Err(PipelineError::configuration(
            "if no shared data directory is given, both the template directory \
             and the BEaST library directory must be specified",
        ));
    }

    let scan = process(&config.scan)?;
    let output_root = process(&config.output_dir)?;
    let share_dir = config.share_dir.as_deref().map(process).transpose()?;

    if !scan.exists() {
        return Err(PipelineError::invalid_input(format!(
            "NIfTI file not found: {}",
            scan.display()
        )));
    }
    let scan_name = scan.file_name().unwrap_or_default().to_string_lossy();
    if !scan_name.ends_with(".nii") && !scan_name.ends_with(".nii.gz") {
        return Err(PipelineError::invalid_input(format!(
            "invalid file format for {}; valid extensions are .nii and .nii.gz",
            scan.display()
        )));
    }
    let scan_is_gzipped = paths::is_gzipped(&scan);

    let template_dir = match config.template_dir.as_deref() {
        Some(dir) => process(dir)?,
        None => {
            let model_dir = template_model_dir(&config.template).ok_or_else(|| {
                PipelineError::configuration(format!(
                    "unrecognized template `{}`; valid names: {}",
                    config.template,
                    KNOWN_TEMPLATES.join(", ")
                ))
            })?;
            // resolve() already rejected the share-dir-less case above
            share_dir.clone().unwrap_or_default().join(model_dir)
        }
    };

    let template_volume = template_dir.join(format!("{}.{}", config.template, EXT_MINC));
    let template_mask = paths::append_to_stem(&template_volume, SUFFIX_TEMPLATE_MASK);
    if !template_volume.exists() {
        return Err(PipelineError::missing_resource(format!(
            "template file not found: {}",
            template_volume.display()
        )));
    }
    if !template_mask.exists() {
        return Err(PipelineError::missing_resource(format!(
            "template mask file not found: {}",
            template_mask.display()
        )));
    }

    let beast_lib_dir = match config.beast_lib_dir.as_deref() {
        Some(dir) => process(dir)?,
        None => share_dir.unwrap_or_default().join(DNAME_BEAST_LIB),
    };
    if !beast_lib_dir.exists() {
        return Err(PipelineError::missing_resource(format!(
            "BEaST library directory not found: {}",
            beast_lib_dir.display()
        )));
    }
    let beast_conf = beast_lib_dir.join(&config.beast_conf);

    Ok(ResolvedInputs {
        scan,
        scan_is_gzipped,
        output_root,
        template_dir,
        template_name: config.template.clone(),
        template_volume,
        template_mask,
        beast_lib_dir,
        beast_conf,
    })
}

fn process(raw: &str) -> Result<PathBuf> {
    paths::process_path(raw).map_err(|e| PipelineError::io(format!("resolving path `{}`", raw), e))
}

impl ResolvedInputs {
    /// The scan file name inside the workspace after materialization:
    /// gzipped scans lose the `.gz`, plain scans keep their name.
    pub fn materialized_name(&self) -> String {
        if self.scan_is_gzipped {
            self.scan
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        } else {
            self.scan
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        }
    }
}

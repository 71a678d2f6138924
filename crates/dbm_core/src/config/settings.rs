//! Immutable run configuration and shared-data constants.

use serde::{Deserialize, Serialize};

/// Default verbosity level (commands echoed, tool stdout inherited).
pub const DEFAULT_VERBOSITY: u8 = 2;
/// Default mincbeast configuration file name.
pub const DEFAULT_BEAST_CONF: &str = "default.1mm.conf";
/// Default anatomical template identifier.
pub const DEFAULT_TEMPLATE: &str = "mni_icbm152_t1_tal_nlin_sym_09c";
/// Environment variable supplying the shared data root.
pub const ENV_SHARE_DIR: &str = "MNI_DATAPATH";
/// BEaST library directory name under the shared data root.
pub const DNAME_BEAST_LIB: &str = "beast-library-1.1";
/// Suffix of the template's companion brain-mask file (no separator).
pub const SUFFIX_TEMPLATE_MASK: &str = "_mask";

/// Template identifiers with a known model directory.
pub const KNOWN_TEMPLATES: [&str; 2] = [
    "mni_icbm152_t1_tal_nlin_sym_09c",
    "mni_icbm152_t1_tal_nlin_sym_09a",
];

/// Model directory name for a template identifier, if recognized.
pub fn template_model_dir(template: &str) -> Option<&'static str> {
    match template {
        "mni_icbm152_t1_tal_nlin_sym_09c" => Some("icbm152_model_09c"),
        "mni_icbm152_t1_tal_nlin_sym_09a" => Some("icbm152_model_09a"),
        _ => None,
    }
}

/// Which workspace artifacts are staged into the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Every file in the workspace.
    All,
    /// Denoised, mask, extracted, nonlinear, and the final DBM NIfTI.
    Subset,
}

/// Run configuration for one pipeline invocation.
///
/// Constructed once at startup and never mutated; paths are raw user
/// strings here and are validated/absolutized by the resolver before
/// any stage runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source anatomical scan (`.nii` or `.nii.gz`).
    pub scan: String,
    /// Root directory for staged outputs.
    pub output_dir: String,
    /// Shared data root holding templates and the BEaST library.
    pub share_dir: Option<String>,
    /// Explicit template directory (overrides the shared-root lookup).
    pub template_dir: Option<String>,
    /// Template identifier (see [`KNOWN_TEMPLATES`]).
    pub template: String,
    /// Explicit BEaST library directory (overrides the shared-root join).
    pub beast_lib_dir: Option<String>,
    /// mincbeast configuration file name, relative to the library dir.
    pub beast_conf: String,
    /// Which artifacts to stage.
    pub save_mode: SaveMode,
    /// Allow writing into a pre-existing non-empty output directory.
    pub overwrite: bool,
    /// Print commands without executing them.
    pub dry_run: bool,
    /// 0 = quiet, 1 = echo commands, 2+ = also inherit tool stdout.
    pub verbosity: u8,
}

impl PipelineConfig {
    /// Create a config for the given scan and output root with defaults
    /// for everything else.
    pub fn new(scan: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            scan: scan.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scan: String::new(),
            output_dir: ".".to_string(),
            share_dir: None,
            template_dir: None,
            template: DEFAULT_TEMPLATE.to_string(),
            beast_lib_dir: None,
            beast_conf: DEFAULT_BEAST_CONF.to_string(),
            save_mode: SaveMode::All,
            overwrite: false,
            dry_run: false,
            verbosity: DEFAULT_VERBOSITY,
        }
    }
}

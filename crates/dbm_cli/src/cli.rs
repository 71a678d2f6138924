//! Command-line interface implementation.

use std::process::ExitCode;

use clap::Parser;

use dbm_core::config::{
    PipelineConfig, SaveMode, DEFAULT_BEAST_CONF, DEFAULT_TEMPLATE, DEFAULT_VERBOSITY,
    ENV_SHARE_DIR,
};

/// Compute a deformation-based morphometry map from a single anatomical
/// scan by orchestrating the MINC toolchain.
#[derive(Parser)]
#[command(name = "dbm-minc")]
#[command(version)]
#[command(about = "Compute a DBM map from an anatomical scan using the MINC toolchain")]
pub struct Cli {
    /// Input NIfTI scan (.nii or .nii.gz)
    scan: String,

    /// Output root directory; results land in a subdirectory named after
    /// the scan
    #[arg(default_value = ".")]
    out_dir: String,

    /// Directory containing the BEaST library and anatomical models.
    /// Uses $MNI_DATAPATH if not specified
    #[arg(long = "share-dir", env = ENV_SHARE_DIR)]
    share_dir: Option<String>,

    /// Directory containing anatomical templates (overrides the
    /// share-dir lookup)
    #[arg(long = "template-dir")]
    template_dir: Option<String>,

    /// Prefix for anatomical model files
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: String,

    /// Path to library directory for mincbeast (overrides the share-dir
    /// join)
    #[arg(long = "beast-lib-dir")]
    beast_lib_dir: Option<String>,

    /// Name of configuration file for mincbeast
    #[arg(long = "beast-conf", default_value = DEFAULT_BEAST_CONF)]
    beast_conf: String,

    /// Save all intermediate files (default)
    #[arg(long = "save-all", overrides_with = "save_subset")]
    save_all: bool,

    /// Save only denoised, mask, extracted, nonlinear, and the DBM map
    #[arg(long = "save-subset", overrides_with = "save_all")]
    save_subset: bool,

    /// Overwrite existing result files
    #[arg(long)]
    overwrite: bool,

    /// Print shell commands without executing them
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Increase verbosity (cumulative); default level is 2
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress output whenever possible; has priority over -v
    #[arg(long)]
    quiet: bool,
}

/// Run the CLI application.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = effective_verbosity(cli.quiet, cli.verbose);
    init_tracing(verbosity);

    let config = PipelineConfig {
        scan: cli.scan,
        output_dir: cli.out_dir,
        share_dir: cli.share_dir,
        template_dir: cli.template_dir,
        template: cli.template,
        beast_lib_dir: cli.beast_lib_dir,
        beast_conf: cli.beast_conf,
        save_mode: save_mode(cli.save_all, cli.save_subset),
        overwrite: cli.overwrite,
        dry_run: cli.dry_run,
        verbosity,
    };

    match dbm_core::run(&config) {
        Ok(report) => {
            tracing::info!(
                "staged {} file(s) into {}",
                report.staged_files.len(),
                report.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("[ERROR] {}", err);
            ExitCode::from(exit_code_to_u8(err.exit_code()))
        }
    }
}

fn effective_verbosity(quiet: bool, verbose: u8) -> u8 {
    if quiet {
        0
    } else if verbose > 0 {
        verbose
    } else {
        DEFAULT_VERBOSITY
    }
}

// the two flags override each other in clap; save-all is the default
fn save_mode(save_all: bool, save_subset: bool) -> SaveMode {
    if save_subset && !save_all {
        SaveMode::Subset
    } else {
        SaveMode::All
    }
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "error",
        1 | 2 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        1
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::try_parse_from(["dbm-minc", "scan001.nii.gz"]).unwrap();
        assert_eq!(cli.scan, "scan001.nii.gz");
        assert_eq!(cli.out_dir, ".");
        assert_eq!(cli.template, DEFAULT_TEMPLATE);
        assert_eq!(cli.beast_conf, DEFAULT_BEAST_CONF);
        assert!(!cli.dry_run);
    }

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "dbm-minc",
            "scan001.nii",
            "out",
            "--template-dir",
            "/models",
            "--beast-lib-dir",
            "/lib",
            "--save-subset",
            "--overwrite",
            "--dry-run",
            "-vvv",
        ])
        .unwrap();
        assert_eq!(cli.out_dir, "out");
        assert!(cli.save_subset);
        assert!(cli.overwrite);
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn save_flags_resolve_to_mode() {
        assert_eq!(save_mode(false, false), SaveMode::All);
        assert_eq!(save_mode(true, false), SaveMode::All);
        assert_eq!(save_mode(false, true), SaveMode::Subset);
    }

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(effective_verbosity(true, 3), 0);
        assert_eq!(effective_verbosity(false, 3), 3);
        assert_eq!(effective_verbosity(false, 0), DEFAULT_VERBOSITY);
    }
}

//! External command execution.
//!
//! Every delegated tool goes through [`CommandRunner`]: it assembles the
//! token list, honors dry-run and verbosity, routes stdout, and converts
//! a nonzero exit status into a fatal [`PipelineError`]. There are no
//! retries; the first failure aborts the run.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::errors::{PipelineError, Result};

/// Where an external command's stdout goes.
#[derive(Debug, Clone, Default)]
pub enum StdoutMode {
    /// Inherit at verbosity >= 2, discard below.
    #[default]
    Auto,
    /// Redirect to a file (used when the stream is the artifact).
    ToFile(PathBuf),
}

/// Runs external commands synchronously, honoring dry-run and verbosity.
#[derive(Debug)]
pub struct CommandRunner {
    dry_run: bool,
    verbosity: u8,
    commands: Vec<String>,
}

impl CommandRunner {
    pub fn new(dry_run: bool, verbosity: u8) -> Self {
        Self {
            dry_run,
            verbosity,
            commands: Vec::new(),
        }
    }

    /// Whether this runner suppresses execution.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Assembled command lines, in submission order.
    pub fn command_lines(&self) -> &[String] {
        &self.commands
    }

    /// Consume the runner and return the assembled command lines.
    pub fn into_command_lines(self) -> Vec<String> {
        self.commands
    }

    /// Run a command with stdout routed per verbosity.
    pub fn run(&mut self, tokens: &[String]) -> Result<()> {
        self.run_with(tokens, &StdoutMode::Auto, false)
    }

    /// Run a command with stdout redirected to `target`.
    pub fn run_redirected(&mut self, tokens: &[String], target: &Path) -> Result<()> {
        self.run_with(tokens, &StdoutMode::ToFile(target.to_path_buf()), false)
    }

    /// Run a command; `silent` suppresses the echoed command line.
    pub fn run_with(&mut self, tokens: &[String], stdout: &StdoutMode, silent: bool) -> Result<()> {
        let args: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        let Some((program, rest)) = args.split_first() else {
            return Err(PipelineError::configuration("empty command"));
        };
        let line = args.join(" ");

        if !silent && (self.verbosity > 0 || self.dry_run) {
            if self.dry_run {
                println!("[RUN] {}", line);
            } else {
                tracing::info!("[RUN] {}", line);
            }
        }
        self.commands.push(line.clone());

        if self.dry_run {
            return Ok(());
        }

        let mut cmd = Command::new(program);
        cmd.args(rest);
        match stdout {
            StdoutMode::ToFile(path) => {
                let file = File::create(path).map_err(|e| {
                    PipelineError::io(format!("creating {}", path.display()), e)
                })?;
                cmd.stdout(Stdio::from(file));
            }
            StdoutMode::Auto => {
                if self.verbosity < 2 {
                    cmd.stdout(Stdio::null());
                }
            }
        }

        let status = cmd.status().map_err(|e| {
            tracing::error!("failed to spawn {}: {}", program, e);
            PipelineError::command_failed(line.clone(), -1)
        })?;
        if !status.success() {
            return Err(PipelineError::command_failed(
                line,
                status.code().unwrap_or(-1),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dry_run_executes_nothing() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("marker");
        let mut runner = CommandRunner::new(true, 0);

        runner
            .run(&tokens(&["touch", &marker.to_string_lossy()]))
            .unwrap();

        assert!(!marker.exists());
        assert_eq!(runner.command_lines().len(), 1);
    }

    #[test]
    fn dry_run_accepts_nonexistent_tools() {
        let mut runner = CommandRunner::new(true, 2);
        runner
            .run(&tokens(&["definitely-not-an-installed-tool", "arg"]))
            .unwrap();
        assert_eq!(
            runner.command_lines(),
            &["definitely-not-an-installed-tool arg".to_string()]
        );
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let mut runner = CommandRunner::new(true, 0);
        runner.run(&tokens(&["ls", "", "-lh", ""])).unwrap();
        assert_eq!(runner.command_lines(), &["ls -lh".to_string()]);
    }

    #[test]
    fn all_empty_tokens_is_an_error() {
        let mut runner = CommandRunner::new(true, 0);
        let err = runner.run(&tokens(&["", ""])).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationError(_)));
    }

    #[test]
    fn nonzero_exit_propagates_code() {
        let mut runner = CommandRunner::new(false, 0);
        let err = runner.run(&tokens(&["sh", "-c", "exit 7"])).unwrap_err();
        match err {
            PipelineError::ExternalCommandFailure { exit_code, command } => {
                assert_eq!(exit_code, 7);
                assert!(command.starts_with("sh -c"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn spawn_failure_is_command_failure() {
        let mut runner = CommandRunner::new(false, 0);
        let err = runner
            .run(&tokens(&["definitely-not-an-installed-tool"]))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ExternalCommandFailure { exit_code: -1, .. }
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn stdout_redirects_to_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("captured");
        let mut runner = CommandRunner::new(false, 0);

        runner
            .run_redirected(&tokens(&["sh", "-c", "printf decompressed"]), &out)
            .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "decompressed");
    }

    #[test]
    fn command_lines_record_in_order() {
        let mut runner = CommandRunner::new(true, 0);
        runner.run(&tokens(&["first", "a"])).unwrap();
        runner.run(&tokens(&["second", "b"])).unwrap();
        assert_eq!(
            runner.command_lines(),
            &["first a".to_string(), "second b".to_string()]
        );
    }
}

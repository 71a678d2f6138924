//! dbm-minc - compute a DBM map from an anatomical scan via the MINC toolchain

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    cli::run()
}

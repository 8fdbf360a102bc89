//! s2uc CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: parse args, dispatch to single-dataset
//! or batch processing, and exit non-zero on failure. For programmatic use,
//! prefer the library API (`s2uc::api`).

use std::process::ExitCode;

use clap::Parser;

mod cli;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

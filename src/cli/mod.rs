//! Command Line Interface (CLI) layer for s2uc.
//!
//! This module defines argument parsing (`args`), error types (`errors`)
//! and the orchestration logic (`runner`) for single-dataset and batch
//! runs. It maps user options onto `PipelineParams` and hands off to
//! `s2uc::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;

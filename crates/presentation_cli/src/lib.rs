//! Climate Advisor command-line interface
//!
//! Argument definitions and rendering live here so they can be tested
//! without running the binary.

pub mod cli;
pub mod output;

pub use cli::{AnalyzeArgs, Cli, Commands, OutputFormat, Window, log_filter_from_verbosity};

//! Pagewait CLI Library
//!
//! Command-line interface for validating and inspecting pagewait page
//! definitions.

#![warn(missing_docs)]
#![allow(clippy::format_push_string)] // String building is clear and correct

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, FormatArg, ShowArgs, ValidateArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_config_text, render_wait, PageSummary, Reporter};

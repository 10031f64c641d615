//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagewait: validate and inspect page definitions for page-object UI tests
#[derive(Parser, Debug)]
#[command(name = "pagewait")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate page definition files
    Validate(ValidateArgs),

    /// Show the elements and readiness checks of a page definition
    Show(ShowArgs),

    /// Show the wait configuration resolved from the environment
    Config(ConfigArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Page definition files (YAML)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Page definition file (YAML)
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_validate_many_files() {
            let cli = Cli::try_parse_from(["pagewait", "validate", "login.yaml", "inventory.yaml"])
                .unwrap();
            match cli.command {
                Commands::Validate(args) => {
                    assert_eq!(args.files.len(), 2);
                    assert_eq!(args.files[0], PathBuf::from("login.yaml"));
                }
                other => panic!("expected validate, got {other:?}"),
            }
        }

        #[test]
        fn test_validate_requires_a_file() {
            assert!(Cli::try_parse_from(["pagewait", "validate"]).is_err());
        }

        #[test]
        fn test_show_format() {
            let cli =
                Cli::try_parse_from(["pagewait", "show", "login.yaml", "--format", "json"]).unwrap();
            match cli.command {
                Commands::Show(args) => assert_eq!(args.format, FormatArg::Json),
                other => panic!("expected show, got {other:?}"),
            }
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::try_parse_from(["pagewait", "config", "-vv", "--color", "never"]).unwrap();
            assert_eq!(cli.verbose, 2);
            assert!(!cli.quiet);
            assert!(matches!(cli.color, ColorArg::Never));
        }

        #[test]
        fn test_unknown_format_rejected() {
            assert!(Cli::try_parse_from(["pagewait", "config", "--format", "xml"]).is_err());
        }
    }
}

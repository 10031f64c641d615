//! Pagewait CLI: validate and inspect page definitions
//!
//! ## Usage
//!
//! ```bash
//! pagewait validate pages/*.yaml          # Check every definition
//! pagewait show pages/login.yaml          # Elements and readiness checks
//! pagewait show pages/login.yaml -f json  # Same, as JSON
//! pagewait config                         # Waits resolved from PAGEWAIT_* env
//! ```

use clap::Parser;
use pagewait_cli::{
    handlers::{run_config, run_show, run_validate},
    Cli, CliConfig, CliResult, ColorChoice, Commands, Reporter, Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    FmtSubscriber::builder()
        .with_max_level(config.verbosity.tracing_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let use_color = config.color.should_color();
    console::set_colors_enabled(use_color);
    let reporter = Reporter::new(use_color, config.verbosity.is_quiet());

    match cli.command {
        Commands::Validate(args) => run_validate(&reporter, &args),
        Commands::Show(args) => run_show(&reporter, &args),
        Commands::Config(args) => run_config(&reporter, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

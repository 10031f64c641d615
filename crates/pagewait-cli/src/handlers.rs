//! Subcommand handlers

use pagewait::{PageDefinition, PagewaitConfig};

use crate::commands::{ConfigArgs, FormatArg, ShowArgs, ValidateArgs};
use crate::error::{CliError, CliResult};
use crate::output::{render_config_text, PageSummary, Reporter};

/// Validate every file, reporting each one; fails if any is invalid
pub fn run_validate(reporter: &Reporter, args: &ValidateArgs) -> CliResult<()> {
    let mut failed = 0;

    for path in &args.files {
        tracing::debug!(path = %path.display(), "validating page definition");
        match PageDefinition::from_file(path) {
            Ok(definition) => reporter.success(&format!(
                "{}: page `{}` ({} elements, {} readiness checks)",
                path.display(),
                definition.name,
                definition.elements.len(),
                definition.gate()?.checks().len()
            )),
            Err(err) => {
                failed += 1;
                reporter.failure(&format!("{}: {err}", path.display()));
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Validation {
            failed,
            total: args.files.len(),
        });
    }
    Ok(())
}

/// Print a page definition's elements and readiness checks
pub fn run_show(reporter: &Reporter, args: &ShowArgs) -> CliResult<()> {
    let definition = PageDefinition::from_file(&args.file)?;
    let summary = PageSummary::from_definition(&definition)?;

    match args.format {
        FormatArg::Text => reporter.line(summary.render_text().trim_end()),
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

/// Print the wait configuration resolved from the environment
pub fn run_config(reporter: &Reporter, args: &ConfigArgs) -> CliResult<()> {
    let config =
        PagewaitConfig::from_env().map_err(|err| CliError::config(err.to_string()))?;

    match args.format {
        FormatArg::Text => {
            reporter.header("pagewait configuration");
            reporter.line(render_config_text(&config).trim_end());
        }
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

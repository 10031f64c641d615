//! Output formatting

use console::{style, Term};
use pagewait::{PageDefinition, PagewaitConfig, PagewaitResult, WaitSpec};
use serde::Serialize;
use std::collections::BTreeMap;

/// Status line printer
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line(&styled);
    }

    /// Print a plain line
    pub fn line(&self, text: &str) {
        if !self.quiet {
            let _ = self.term.write_line(text);
        }
    }
}

/// Printable summary of a page definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page name
    pub name: String,
    /// URL opened by the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Wait override, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitSpec>,
    /// Element name to locator
    pub elements: BTreeMap<String, String>,
    /// Readiness checks, in evaluation order
    pub ready: Vec<String>,
}

impl PageSummary {
    /// Summarize a validated definition
    pub fn from_definition(definition: &PageDefinition) -> PagewaitResult<Self> {
        let gate = definition.gate()?;
        Ok(Self {
            name: definition.name.clone(),
            url: definition.url.clone(),
            wait: definition.wait,
            elements: definition
                .elements
                .iter()
                .map(|(name, locator)| (name.clone(), locator.to_string()))
                .collect(),
            ready: gate.checks().iter().map(ToString::to_string).collect(),
        })
    }

    /// Human-readable rendering
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = format!("Page: {}\n", self.name);
        if let Some(url) = &self.url {
            out.push_str(&format!("  url:  {url}\n"));
        }
        if let Some(wait) = &self.wait {
            out.push_str(&format!("  wait: {}\n", render_wait(wait)));
        }

        out.push_str(&format!("Elements ({}):\n", self.elements.len()));
        let width = self.elements.keys().map(String::len).max().unwrap_or(0);
        for (name, locator) in &self.elements {
            out.push_str(&format!("  {name:<width$}  {locator}\n"));
        }

        out.push_str(&format!("Readiness checks ({}):\n", self.ready.len()));
        for (index, check) in self.ready.iter().enumerate() {
            out.push_str(&format!("  {}. {check}\n", index + 1));
        }
        out
    }
}

/// `timeout / poll` rendering of a wait
#[must_use]
pub fn render_wait(wait: &WaitSpec) -> String {
    if wait.is_immediate() {
        "single pass".to_string()
    } else {
        format!("{}ms timeout, {}ms poll", wait.timeout_ms, wait.poll_interval_ms)
    }
}

/// Human-readable rendering of the resolved configuration
#[must_use]
pub fn render_config_text(config: &PagewaitConfig) -> String {
    format!(
        "wait:       {}\nprobe wait: {}\n",
        render_wait(&config.wait),
        render_wait(&config.probe_wait)
    )
}

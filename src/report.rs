//! Issue Reporter - run-scoped findings
//!
//! Every component appends to a `Report` that is threaded through the run and
//! returned to the caller. Issues are never removed or merged.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// The subsystem an issue was raised by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Meta,
    Tokens,
    Grid,
    Motion,
    Assets,
    Registry,
    Route,
    Slice,
    AssetFile,
    AssetRef,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meta => "meta",
            Category::Tokens => "tokens",
            Category::Grid => "grid",
            Category::Motion => "motion",
            Category::Assets => "assets",
            Category::Registry => "registry",
            Category::Route => "route",
            Category::Slice => "slice",
            Category::AssetFile => "asset-file",
            Category::AssetRef => "asset-ref",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub category: Category,
    pub file: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Issue {
    fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.file, line),
            None => self.file.clone(),
        }
    }
}

/// Findings of one run, bucketed by severity. Serializes to the persisted report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub info: Vec<Issue>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    PassWithWarnings,
    Fail,
}

impl Outcome {
    /// Warnings are advisory and never fail a run.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Pass | Outcome::PassWithWarnings => 0,
            Outcome::Fail => 1,
        }
    }
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        severity: Severity,
        category: Category,
        file: &str,
        message: impl Into<String>,
    ) {
        self.record_issue(
            severity,
            Issue {
                category,
                file: file.to_string(),
                message: message.into(),
                line: None,
            },
        );
    }

    pub fn record_issue(&mut self, severity: Severity, issue: Issue) {
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Info => self.info.push(issue),
        }
    }

    pub fn error(&mut self, category: Category, file: &str, message: impl Into<String>) {
        self.record(Severity::Error, category, file, message);
    }

    pub fn warning(&mut self, category: Category, file: &str, message: impl Into<String>) {
        self.record(Severity::Warning, category, file, message);
    }

    pub fn info(&mut self, category: Category, file: &str, message: impl Into<String>) {
        self.record(Severity::Info, category, file, message);
    }

    pub fn summarize(&self) -> Summary {
        Summary {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            info: self.info.len(),
            total: self.errors.len() + self.warnings.len() + self.info.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summarize().total == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn outcome(&self) -> Outcome {
        if self.has_errors() {
            Outcome::Fail
        } else if self.is_empty() {
            Outcome::Pass
        } else {
            Outcome::PassWithWarnings
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn persist(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json + "\n")
    }

    /// Human-readable rendering. Info issues only appear when `verbose`.
    pub fn render(&self, out: &mut impl Write, verbose: bool) -> io::Result<()> {
        let summary = self.summarize();
        writeln!(out, "VALIDATION SUMMARY")?;
        writeln!(out)?;
        writeln!(out, "Errors:   {}", summary.errors)?;
        writeln!(out, "Warnings: {}", summary.warnings)?;
        writeln!(out, "Info:     {}", summary.info)?;
        writeln!(out, "Total:    {}", summary.total)?;
        writeln!(out)?;

        render_section(out, "ERRORS (MUST FIX):", &self.errors)?;
        render_section(out, "WARNINGS (SHOULD FIX):", &self.warnings)?;
        if verbose {
            render_section(out, "INFO:", &self.info)?;
        }

        match self.outcome() {
            Outcome::Pass => writeln!(out, "ALL VALIDATIONS PASSED"),
            Outcome::PassWithWarnings => writeln!(out, "VALIDATION PASSED (with warnings)"),
            Outcome::Fail => writeln!(out, "VALIDATION FAILED: please fix the errors above"),
        }
    }
}

fn render_section(out: &mut impl Write, title: &str, issues: &[Issue]) -> io::Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", title)?;
    writeln!(out)?;
    for issue in issues {
        writeln!(out, "   [{}] {}", issue.category, issue.location())?;
        writeln!(out, "      {}", issue.message)?;
        writeln!(out)?;
    }
    Ok(())
}

//! Shared output for assignmate CLI commands.
//!
//! Every command builds a `Report` for people and a serializable payload for
//! `--json`. JSON output is wrapped in a versioned envelope so scripts can
//! tell success from failure without parsing stderr.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "assignmate.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable rendering of a command result.
#[derive(Debug, Clone, Default)]
pub struct Report {
    title: String,
    fields: Vec<(String, String)>,
    lines: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Labelled value shown in the aligned block under the title.
    pub fn field(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.fields.push((label.into(), value.into()));
    }

    /// Free-form line (list rows, notes, fired reminders).
    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.warnings.push(text.into());
    }

    /// Command worth running next; also carried in the JSON envelope.
    pub fn suggest(&mut self, command: impl Into<String>) {
        self.suggestions.push(command.into());
    }

    pub fn render(&self) -> String {
        let mut out = self.title.clone();

        let width = self
            .fields
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        for (label, value) in &self.fields {
            let _ = write!(out, "\n  {label:<width$}  {value}");
        }

        if !self.lines.is_empty() {
            out.push('\n');
            for line in &self.lines {
                let _ = write!(out, "\n  {line}");
            }
        }

        if !self.warnings.is_empty() || !self.suggestions.is_empty() {
            out.push('\n');
        }
        for warning in &self.warnings {
            let _ = write!(out, "\nwarning: {warning}");
        }
        for suggestion in &self.suggestions {
            let _ = write!(out, "\nnext: {suggestion}");
        }
        out
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Success,
    Error,
}

#[derive(Serialize)]
struct Envelope<'a, B: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: Status,
    #[serde(flatten)]
    body: B,
    #[serde(skip_serializing_if = "is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    next_steps: &'a [String],
}

fn is_empty(items: &&[String]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
struct SuccessBody<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// Print a successful result: JSON envelope, the report, or nothing with `--quiet`.
pub fn emit<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    report: &Report,
) -> Result<()> {
    if options.json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Success,
            body: SuccessBody { data },
            warnings: &report.warnings,
            next_steps: &report.suggestions,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if !options.quiet {
        println!("{}", report.render());
    }
    Ok(())
}

/// Print a failure. JSON goes to stdout so scripts get one document either
/// way; the human form goes to stderr with an optional hint.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = recovery_hint(err);
    if json {
        let next_steps: Vec<String> = hint.into_iter().map(str::to_string).collect();
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Error,
            body: ErrorBody {
                error: ErrorPayload {
                    message: err.to_string(),
                    code: err.exit_code(),
                    kind: error_kind(err),
                    details: err.details(),
                },
            },
            warnings: &[],
            next_steps: &next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

fn error_kind(err: &Error) -> &'static str {
    if err.is_user_error() {
        "user_error"
    } else {
        "operation_failed"
    }
}

fn recovery_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::AssignmentNotFound(_) => Some("assignmate list --filter all"),
        Error::AmbiguousId { .. } => Some("use a longer id prefix"),
        Error::InvalidConfig(_) => Some("fix config.toml in the data directory then retry"),
        Error::NoDataDir => Some("assignmate --data-dir <path> ..."),
        Error::Cancelled(_) => Some("pass --yes to skip the confirmation"),
        _ => None,
    }
}

/// Command name for error envelopes, taken from the raw arguments because
/// clap may fail before a `Cli` exists.
pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

// Global flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--data-dir"];

fn next_positional(args: &mut impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
        } else if !arg.starts_with('-') {
            return Some(arg);
        }
    }
    None
}

fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    match next_positional(&mut args) {
        None => "assignmate".to_string(),
        Some(command) if command == "notify" => match next_positional(&mut args) {
            Some(sub) => format!("notify {sub}"),
            None => command,
        },
        Some(command) => command,
    }
}

//! Terminal output for s3kv commands
//!
//! A command ends in one of three ways: a result, "no value", or an error
//! that escaped the proxy. The formatter prints each of them in human or
//! JSON form and picks the matching exit code.

use serde::Serialize;

use super::OutputConfig;
use crate::exit_code::ExitCode;

#[derive(Debug, Clone, Copy)]
enum Mark {
    Done,
    Failed,
    Caution,
}

impl Mark {
    const fn glyph(self) -> &'static str {
        match self {
            Self::Done => "✓",
            Self::Failed => "✗",
            Self::Caution => "⚠",
        }
    }

    const fn ansi(self) -> &'static str {
        match self {
            Self::Done => "32",
            Self::Failed => "31",
            Self::Caution => "33",
        }
    }
}

/// Prints command outcomes according to the global output flags
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Colors apply to human output only
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn marked(&self, mark: Mark, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{}m{}\x1b[0m {message}", mark.ansi(), mark.glyph())
        } else {
            format!("{} {message}", mark.glyph())
        }
    }

    fn print_json<T: Serialize>(value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Unwrap a proxy outcome, reporting the absent and failed cases
    ///
    /// `what` completes "No value returned when ...".
    pub fn settle<T>(
        &self,
        outcome: kv_core::Result<Option<T>>,
        what: &str,
    ) -> Result<T, ExitCode> {
        match outcome {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                self.error(&format!("No value returned when {what}"));
                Err(ExitCode::NoValue)
            }
            Err(e) => {
                self.error(&e.to_string());
                Err(ExitCode::from_error(&e))
            }
        }
    }

    /// Report that the storage backend could not be configured
    pub fn config_failure(&self, error: &kv_core::Error) -> ExitCode {
        self.error(&format!("Failed to configure storage: {error}"));
        ExitCode::from_error(error)
    }

    /// Confirm a completed write: `value` in JSON mode, a marked line otherwise
    pub fn done<T: Serialize>(&self, value: &T, human: &str) {
        if self.config.quiet {
            return;
        }
        if self.config.json {
            Self::print_json(value);
        } else {
            println!("{}", self.marked(Mark::Done, human));
        }
    }

    /// Print a result: `value` in JSON mode, `human` verbatim otherwise
    pub fn value<T: Serialize>(&self, value: &T, human: &str) {
        if self.config.quiet {
            return;
        }
        if self.config.json {
            Self::print_json(value);
        } else {
            println!("{human}");
        }
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, message: &str) {
        if self.config.json {
            Self::print_json(&serde_json::json!({ "error": message }));
        } else {
            eprintln!("{}", self.marked(Mark::Failed, message));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{}", self.marked(Mark::Caution, message));
    }
}

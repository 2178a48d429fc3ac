//! Outcome reporting
//!
//! Every backend reply and failure passes through here. Recoverable
//! failures are logged with an operation-specific message and collapsed
//! into an empty result; configuration errors are passed on untouched.

use std::fmt;

use crate::error::{Error, ErrorKind, Result};

/// The proxy operation a report belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Put,
    Get,
    Delete,
    List,
    Clear,
}

impl Operation {
    /// Stable name used as a log field
    pub const fn name(self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Get => "get",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Clear => "clear",
        }
    }

    /// What the operation was doing, for failure messages
    pub const fn activity(self) -> &'static str {
        match self {
            Self::Put => "writing an object",
            Self::Get => "reading an object",
            Self::Delete => "deleting an object",
            Self::List => "listing objects",
            Self::Clear => "deleting objects by prefix",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn log_accepted(op: Operation, status: u16) {
    tracing::info!(operation = %op, status, "Status code {status} for S3 request");
}

/// Log a backend status and tell whether it is one of the accepted ones
///
/// Used where a rejected status is handled in place rather than returned.
pub fn report_status(op: Operation, status: u16, accepted: &[u16]) -> bool {
    if accepted.contains(&status) {
        log_accepted(op, status);
        true
    } else {
        tracing::error!(operation = %op, status, "Status code {status} for S3 request");
        false
    }
}

/// Turn a non-accepted status into an error so it can travel with `?`
///
/// The rejection is logged once, by [`absorb`], when the error is collapsed.
pub fn ensure_status(op: Operation, status: u16, accepted: &[u16]) -> Result<()> {
    if accepted.contains(&status) {
        log_accepted(op, status);
        Ok(())
    } else {
        Err(Error::Status {
            status,
            message: format!("unexpected reply when {}", op.activity()),
        })
    }
}

/// Collapse a recoverable failure into `None`
///
/// Configuration errors propagate.
pub fn absorb<T>(op: Operation, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.kind() {
            ErrorKind::Config => Err(e),
            ErrorKind::Validation => {
                tracing::warn!(operation = %op, error = %e, "Rejected request");
                Ok(None)
            }
            ErrorKind::Status | ErrorKind::Transport => {
                tracing::error!(
                    operation = %op,
                    error = %e,
                    "Error encountered when {}",
                    op.activity()
                );
                Ok(None)
            }
        },
    }
}

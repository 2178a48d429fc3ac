//! Exit code definitions for the s3kv CLI
//!
//! Storage failures are not distinguishable from one another (a missing
//! key, a denied request and a timeout all come back as "no value"), so
//! the codes only separate success, an empty result, and bad input.

/// Exit codes for the s3kv CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// The operation returned no value
    NoValue = 1,

    /// User input or configuration error: bad arguments, unknown region, etc.
    UsageError = 2,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::NoValue),
            2 => Some(Self::UsageError),
            _ => None,
        }
    }

    /// Exit code for an error that escaped a proxy operation
    pub const fn from_error(error: &kv_core::Error) -> Self {
        match Self::from_i32(error.exit_code()) {
            Some(code) => code,
            None => Self::NoValue,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::NoValue => "Operation returned no value",
            Self::UsageError => "Invalid arguments or configuration",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

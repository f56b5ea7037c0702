//! Exit codes for the sg-core CLI.
//!
//! Scripts can branch on the code without parsing output.
//!
//! Exit code ranges:
//! - 0-1: Replay outcomes
//! - 10-19: Caller errors (bad arguments, configuration, or input)
//! - 20-29: Internal and I/O errors

use sg_common::{Error, ErrorCategory};

/// Exit codes for sg-core commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed; no spikes seen
    Clean = 0,

    /// Replay completed and at least one spike was detected
    SpikesDetected = 1,

    /// Invalid arguments
    ArgsError = 10,

    /// Input stream is malformed or out of order
    InputError = 11,

    /// Configuration file or values rejected
    ConfigError = 12,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0 and 1 both mean the command ran to completion.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::SpikesDetected)
    }

    /// Fixable by the caller (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    pub fn is_error(self) -> bool {
        self.as_i32() >= 10
    }

    /// Stable name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::SpikesDetected => "OK_SPIKES",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a library error.
    pub fn for_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Input => ExitCode::InputError,
            ErrorCategory::Numeric => ExitCode::InternalError,
            ErrorCategory::Io => match err {
                Error::Io(_) => ExitCode::IoError,
                _ => ExitCode::InternalError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

use std::fmt;

/// Failure of a pipeline step. Every variant is terminal for the running command.
#[derive(Debug, Clone, PartialEq)]
pub enum PackError {
    /// A required directory or file is missing or empty.
    Precondition { message: String, hint: Option<String> },
    /// An external tool exited unsuccessfully. `code` is `None` when killed by a signal.
    Subprocess { program: String, code: Option<i32> },
    /// The archive landed somewhere other than predicted.
    Consistency(String),
    Io(String),
    Config(String),
}

impl PackError {
    pub fn precondition(message: impl Into<String>) -> Self {
        PackError::Precondition {
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            PackError::Precondition { message, .. } => PackError::Precondition {
                message,
                hint: Some(hint.into()),
            },
            other => other,
        }
    }

    /// Process exit status for this failure. Subprocess failures forward the child's code.
    pub fn exit_code(&self) -> u8 {
        match self {
            PackError::Subprocess {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::Precondition { message, hint } => match hint {
                Some(h) => write!(f, "{} ({})", message, h),
                None => write!(f, "{}", message),
            },
            PackError::Subprocess { program, code } => match code {
                Some(c) => write!(f, "{} failed with exit code {}", program, c),
                None => write!(f, "{} was terminated by a signal", program),
            },
            PackError::Consistency(msg) => write!(f, "Consistency check failed: {}", msg),
            PackError::Io(msg) => write!(f, "{}", msg),
            PackError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for PackError {}

use std::fmt;

/// Stable categories surfaced in `--json` error payloads and used to decide
/// what a failure means for the run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connection,
    /// The requested scope contains no text-capable column to search.
    EmptyScope,
    /// A catalog name cannot be quoted safely; the request was aborted.
    InvalidIdentifier,
    /// The engine rejected or failed a synthesized statement.
    Execution,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "Config",
            ErrorKind::Connection => "Connection",
            ErrorKind::EmptyScope => "EmptyScope",
            ErrorKind::InvalidIdentifier => "InvalidIdentifier",
            ErrorKind::Execution => "Execution",
            ErrorKind::Internal => "Internal",
        }
    }
}

/// An error that knows its reporting category.
#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

/// Recovers the category from anywhere in the error chain. Context wrappers
/// added on the way up must not hide it.
pub fn classify_error(err: &anyhow::Error) -> ErrorKind {
    for cause in err.chain() {
        if let Some(app) = cause.downcast_ref::<AppError>() {
            return app.kind;
        }
    }
    ErrorKind::Internal
}

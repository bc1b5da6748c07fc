use std::fmt;

/// Coarse failure classification carried to the JSON error envelope and
/// exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Config file or profile resolution problems.
    Config,
    /// DNS, TCP or login failures before any statement runs.
    Connection,
    /// A statement the server rejected, or a malformed result.
    Query,
    /// A caller-visible contract violation: no primary key on a table
    /// requested for row comparison, or duplicate key values in a result.
    Precondition,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "Config",
            ErrorKind::Connection => "Connection",
            ErrorKind::Query => "Query",
            ErrorKind::Precondition => "Precondition",
            ErrorKind::Internal => "Internal",
        }
    }
}

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
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

/// Anything that did not come through `AppError` is Internal.
pub fn classify_error(err: &anyhow::Error) -> ErrorKind {
    err.downcast_ref::<AppError>()
        .map(|app| app.kind)
        .unwrap_or(ErrorKind::Internal)
}

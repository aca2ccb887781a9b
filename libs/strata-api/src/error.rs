//! The error a host sees when a codec call fails.

use std::fmt;

use crate::format::{LoadError, WriteError};

/// What failed, so the host can tell a broken table definition from one bad
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Table properties are unreadable or carry an invalid value.
    Config,
    /// Column names and types do not form a schema.
    Schema,
    /// One record could not be encoded or decoded.
    Record,
    /// The value writer refused a call.
    Writer,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Schema => "schema",
            ErrorKind::Record => "record",
            ErrorKind::Writer => "writer",
        };
        f.write_str(name)
    }
}

/// "Serialization failed", with a kind and the cause rendered as text.
#[derive(Clone)]
pub struct PluginError {
    kind: ErrorKind,
    message: String,
}

impl PluginError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message with `ctx: `; the kind is unchanged.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Debug for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PluginError {}

impl From<WriteError> for PluginError {
    fn from(e: WriteError) -> Self {
        Self::new(ErrorKind::Writer, e.to_string())
    }
}

impl From<LoadError> for PluginError {
    fn from(e: LoadError) -> Self {
        Self::new(ErrorKind::Record, e.to_string())
    }
}

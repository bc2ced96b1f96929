use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub enum ImportError {
    Io(io::Error),
    Syntax(jzon::Error),
    /// A required field is absent; carries the path of the field.
    Missing(String),
    Type { path: String, expected: &'static str },
    Invalid { path: String, reason: String },
}

impl ImportError {
    /// Path of the offending field, if the error is about one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ImportError::Io(_) | ImportError::Syntax(_) => None,
            ImportError::Missing(path) => Some(path),
            ImportError::Type { path, .. } | ImportError::Invalid { path, .. } => Some(path),
        }
    }
}

impl From<io::Error> for ImportError {
    fn from(error: io::Error) -> Self {
        ImportError::Io(error)
    }
}

impl From<jzon::Error> for ImportError {
    fn from(error: jzon::Error) -> Self {
        ImportError::Syntax(error)
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(error) => write!(f, "{error}"),
            ImportError::Syntax(error) => write!(f, "malformed JSON: {error}"),
            ImportError::Missing(path) => write!(f, "{path}: missing field"),
            ImportError::Type { path, expected } => write!(f, "{path}: expected {expected}"),
            ImportError::Invalid { path, reason } => write!(f, "{path}: {reason}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(error) => Some(error),
            ImportError::Syntax(error) => Some(error),
            _ => None,
        }
    }
}

use std::fmt::{self, Display};
use std::io;

use crate::Dialect;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    UnknownDialect(String),
    /// A raw snippet written for one dialect was rendered into another.
    DialectMismatch { name: String, expected: Dialect, found: Dialect },
    UnknownSignal(String),
    RegisterOutsideSynchronous(String),
    VariableOutsideProcess(String),
    NonRegisterWrite { process: String, name: String },
    DuplicateVariable(String),
    EmptyCase { control: String },
    EmptySwitch { control: String },
    DuplicateElse,
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(error) => write!(f, "{error}"),
            Error::UnknownDialect(name) => write!(f, "unknown HDL dialect {name:?}"),
            Error::DialectMismatch { name, expected, found } => {
                write!(f, "operation {name:?} is implemented in {expected} and cannot be rendered as {found}")
            }
            Error::UnknownSignal(name) => write!(f, "signal {name:?} is not declared"),
            Error::RegisterOutsideSynchronous(name) => {
                write!(f, "assigning to register {name:?} is only allowed in synchronous context")
            }
            Error::VariableOutsideProcess(name) => {
                write!(f, "variable {name:?} may only be assigned inside a process")
            }
            Error::NonRegisterWrite { process, name } => {
                write!(f, "synchronous process {process:?} writes non-register {name:?}")
            }
            Error::DuplicateVariable(name) => write!(f, "variable {name:?} is declared more than once"),
            Error::EmptyCase { control } => write!(f, "case of switch on {control:?} has no label"),
            Error::EmptySwitch { control } => write!(f, "switch on {control:?} has no cases"),
            Error::DuplicateElse => write!(f, "cannot add a second else block"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}

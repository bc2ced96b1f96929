use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

use hwgen_hdl::Dialect;

#[derive(Debug)]
pub enum Error {
    Hdl(hwgen_hdl::Error),
    Io { path: PathBuf, error: io::Error },
    SnippetNotFound(PathBuf),
    UnknownUnit(String),
    UnknownOperation(String),
    UnknownPort { unit: String, port: String },
    MissingImplementation { operation: String, dialect: Dialect },
    NoDags(String),
    NoValidDags(String),
    OutputLatencyMismatch(String),
    BidirectionalPort(String),
    UnboundOperand { operation: String, operand: u32 },
    ZeroWidthPort(String),
    ZeroWidthOperand { operation: String, operand: u32 },
    NegativeCycle { operation: String },
    NoTriggerPort(String),
    InvalidAddressSpace(String),
    TooManyInputs { limit: usize },
    TooManyOutputs { limit: usize },
    /// Generation of a function unit was aborted.
    Unit { unit: String, source: Box<Error> },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Error::Io { path: path.into(), error }
    }

    pub(crate) fn in_unit(self, unit: &str) -> Self {
        match self {
            Error::Unit { .. } => self,
            _ => Error::Unit { unit: unit.to_owned(), source: Box::new(self) },
        }
    }
}

impl From<hwgen_hdl::Error> for Error {
    fn from(error: hwgen_hdl::Error) -> Self {
        Error::Hdl(error)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Hdl(error) => write!(f, "{error}"),
            Error::Io { path, error } => write!(f, "{}: {error}", path.display()),
            Error::SnippetNotFound(path) => write!(f, "cannot find implementation file {}", path.display()),
            Error::UnknownUnit(name) => write!(f, "function unit {name:?} is not in the architecture"),
            Error::UnknownOperation(name) => write!(f, "operation {name:?} is not defined"),
            Error::UnknownPort { unit, port } => write!(f, "function unit {unit:?} has no port {port:?}"),
            Error::MissingImplementation { operation, dialect } => {
                write!(f, "cannot generate operation {operation:?} due to missing {dialect} operation implementation")
            }
            Error::NoDags(operation) => write!(f, "{operation} has no dags to implement"),
            Error::NoValidDags(operation) => write!(f, "{operation} has no valid dags to implement"),
            Error::OutputLatencyMismatch(operation) => {
                write!(f, "cannot implement multi-output operation {operation} with different output latencies")
            }
            Error::BidirectionalPort(port) => write!(f, "unsupported bidirectional port {port}"),
            Error::UnboundOperand { operation, operand } => {
                write!(f, "operand {operand} of operation {operation} is not bound to a port")
            }
            Error::ZeroWidthPort(port) => write!(f, "port {port} has width 0"),
            Error::ZeroWidthOperand { operation, operand } => {
                write!(f, "operand {operand} of operation {operation} has width 0")
            }
            Error::NegativeCycle { operation } => {
                write!(f, "operation {operation} would start before its trigger; implementation latency too high")
            }
            Error::NoTriggerPort(unit) => write!(f, "function unit {unit:?} has no triggering port"),
            Error::InvalidAddressSpace(name) => write!(f, "address space {name:?} has invalid bounds"),
            Error::TooManyInputs { limit } => write!(f, "more than {limit} input ports in a co-processor unit"),
            Error::TooManyOutputs { limit } => write!(f, "more than {limit} output ports in a co-processor unit"),
            Error::Unit { unit, source } => write!(f, "cannot generate {unit}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Hdl(error) => Some(error),
            Error::Io { error, .. } => Some(error),
            Error::Unit { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

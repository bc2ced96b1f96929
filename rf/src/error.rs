use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Hdl(hwgen_hdl::Error),
    Io { path: PathBuf, error: io::Error },
    NoRegisters(String),
    ZeroWidth(String),
    UnsupportedGuardLatency { rf: String, latency: u32 },
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
            Error::NoRegisters(rf) => write!(f, "register file {rf:?} has no registers"),
            Error::ZeroWidth(rf) => write!(f, "register file {rf:?} has registers of width 0"),
            Error::UnsupportedGuardLatency { rf, latency } => {
                write!(f, "register file {rf:?} has guard latency {latency}; only 0 and 1 are supported")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Hdl(error) => Some(error),
            Error::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

use std::error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// An error produced while parsing a dictionary or rule source file.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    line: Option<u64>,
    path: Option<PathBuf>,
}

/// The kind of error that occurred.
#[derive(Debug)]
pub enum ErrorKind {
    /// The source file could not be read.
    Io(io::Error),
    /// A line did not conform to the expected grammar.
    Format(String),
    /// An unrecognized POS tag, config key, or out-of-range index.
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Error {
        Error { kind: ErrorKind::Format(msg.into()), line: None, path: None }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Error {
        Error { kind: ErrorKind::InvalidArgument(msg.into()), line: None, path: None }
    }

    /// Attach a 1-based source line number to this error.
    pub fn with_line(mut self, line: u64) -> Error {
        self.line = Some(line);
        self
    }

    /// Attach a source file path to this error.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Error {
        self.path = Some(path.into());
        self
    }

    /// Return the specific kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the 1-based line number at which this error occurred, if known.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    /// Return the file path associated with this error, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error { kind: ErrorKind::Io(err), line: None, path: None }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref path) = self.path {
            if let Some(line) = self.line {
                write!(f, "{}:{}: ", path.display(), line)?;
            } else {
                write!(f, "{}: ", path.display())?;
            }
        } else if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        match self.kind {
            ErrorKind::Io(ref err) => write!(f, "{}", err),
            ErrorKind::Format(ref msg) => write!(f, "{}", msg),
            ErrorKind::InvalidArgument(ref msg) => write!(f, "{}", msg),
        }
    }
}

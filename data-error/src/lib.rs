use std::{fmt, io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixtureError>;

/// Filesystem operation that failed, reported together with the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Stat,
    Create,
    Open,
    Read,
    Write,
    Flush,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            IoOp::Stat => "stat",
            IoOp::Create => "create",
            IoOp::Open => "open",
            IoOp::Read => "read",
            IoOp::Write => "write",
            IoOp::Flush => "flush",
        };
        f.write_str(verb)
    }
}

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Fixture at {} has not been ensured yet", .0.display())]
    NotReady(PathBuf),
    #[error("Size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error(
        "Pattern mismatch at offset {offset}: expected {expected:#04x}, found {found:#04x}"
    )]
    PatternMismatch { offset: u64, expected: u8, found: u8 },
    #[error("Parsing error: {0}")]
    Parse(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FixtureError {
    pub fn io(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// The underlying I/O error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Attaches the failed operation and path to a bare `io::Result`.
pub trait IoContext<T> {
    fn with_path(self, op: IoOp, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn with_path(self, op: IoOp, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| FixtureError::io(op, path, e))
    }
}

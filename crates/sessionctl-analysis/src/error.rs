use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The worker process did not answer within its deadline (spec §7
    /// `WorkerTimeout`). Non-fatal: the caller treats the chunk as if it
    /// returned no verdicts.
    Timeout,
    /// The worker replied, but nothing resembling a verdict array could be
    /// found in its output (spec §7 `WorkerReplyUnparseable`).
    Unparseable(String),
    /// Spawning or waiting on the worker process failed outright.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Timeout => write!(f, "analysis worker timed out"),
            Error::Unparseable(raw) => write!(f, "analysis worker reply could not be parsed: {raw}"),
            Error::Io(err) => write!(f, "failed to run analysis worker: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

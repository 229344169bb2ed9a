use std::io;
use std::path::PathBuf;

/// Central error type.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse { path: PathBuf, errors: usize },
    Verification,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

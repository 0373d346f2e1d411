use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure confined to a single file; the load records it and moves on.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("file is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("failed to parse DICOM data: {0}")]
    Parse(#[from] dicom::object::ReadError),
    #[error("overlay planes unpack to {size} bytes, over the {limit} byte limit")]
    OverlayTooLarge { size: u64, limit: u64 },
    #[error("missing required identifier {0}")]
    MissingIdentifier(&'static str),
}

/// Why a load produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoStudyHeader,
    NoSeries,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoStudyHeader => f.write_str("no file carries a study instance UID"),
            EmptyReason::NoSeries => f.write_str("no image series found"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("nothing found: {0}")]
    Empty(EmptyReason),
    #[error("failed to scan {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::crypto::CryptoError;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is terminal for the call that produced it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input and output file names are the same: {0}")]
    SameFileName(PathBuf),
    #[error("Destination already exists: {0} (pass --force to overwrite)")]
    DestinationExists(PathBuf),
    #[error("Not a valid .scc container")]
    InvalidFile,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Missing frames: header declares {expected}, stream holds {actual}")]
    MissingFrames { expected: i64, actual: i64 },
    #[error("Checksum mismatch in frame {index}: stored {expected:08x}, computed {actual:08x}")]
    ChecksumMismatch { index: i64, expected: u32, actual: u32 },
    #[error("Cipher error: {0}")]
    Cipher(#[from] CryptoError),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_data(msg: impl Into<String>) -> Self {
        Error::InvalidData(msg.into())
    }
}

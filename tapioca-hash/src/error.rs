//! Error types for fingerprint encoding

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("fingerprint is not valid base64url: {0}")]
    InvalidFingerprint(#[from] base64::DecodeError),

    #[error("decoded fingerprint has {0} bytes, expected {1}")]
    WrongDigestLength(usize, usize),
}

pub type Result<T> = std::result::Result<T, Error>;

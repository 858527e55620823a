//! Error kinds for the build database (spec.md §7: `DbError`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("manifest error: {0}")]
    Manifest(#[from] tapioca_manifest::Error),

    #[error("config encode error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blocking task panicked: {0}")]
    TaskPanic(String),

    #[error("no such build: {project}/{branch}/{build}")]
    NoSuchBuild { project: String, branch: String, build: String },
}

pub type Result<T> = std::result::Result<T, Error>;

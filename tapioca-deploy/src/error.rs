//! Error kinds for deployment handler dispatch (spec.md §4.8).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no handler registered for {0:?}")]
    UnknownHandler(String),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] tapioca_blocks::Error),

    #[error("database error: {0}")]
    Db(#[from] tapioca_db::Error),

    #[error("handler error: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, Error>;

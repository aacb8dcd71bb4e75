use std::path::PathBuf;
use thiserror::Error;

#[derive(Error,Debug)]
pub enum Error {
    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("File '{0:?}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Named item '{0:}' not found")]
    NotFound(String),

    #[error("The given text '{0:}' can not be interpreted as time.")]
    InvalidTime(String),

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

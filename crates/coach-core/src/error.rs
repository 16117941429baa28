//! Error types for the coach client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid transaction: {0}")]
    Validation(String),

    #[error("{0} already in progress")]
    InProgress(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

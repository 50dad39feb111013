use std::io;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Parse error: invalid integer {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP status error: {0}")]
    Status(reqwest::StatusCode),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

pub type AppResult<T> = Result<T, AppError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Index is empty: {0}")]
    EmptyIndex(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Empty query")]
    EmptyQuery,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogstatError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(String),
}

impl LogstatError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

pub type Result<T> = std::result::Result<T, LogstatError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GfiError {
    #[error("failed to create GitHub client: {0}")]
    Client(String),

    #[error("failed to search issues: {0}")]
    Search(String),

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GfiError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermError {
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("key reader task failed: {0}")]
    KeyReader(#[from] tokio::task::JoinError),
}

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Stale element reference: {0}")]
    StaleElement(String),
    #[error("No such browsing context: {0}")]
    NoSuchContext(String),
    #[error("Connection lost")]
    ConnectionLost,
    #[error("Timeout")]
    Timeout,
    #[error("Not ready")]
    NotReady,
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Other: {0}")]
    Other(String),
}

impl BackendError {
    pub fn is_stale(&self) -> bool {
        matches!(self, BackendError::StaleElement(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, BackendError::NotSupported(_))
    }
}

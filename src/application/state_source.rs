// Source trait for aircraft state vector snapshots
use crate::domain::state_vector::Snapshot;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete in time. The only failure the polling loop
    /// recovers from.
    #[error("request to state vector source timed out")]
    Timeout,

    #[error("request to state vector source failed: {0}")]
    Http(String),

    #[error("state vector source answered with status {0}")]
    Status(u16),

    #[error("failed to decode state vectors: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

#[async_trait]
pub trait StateVectorSource: Send + Sync {
    /// Fetch the current global state vectors
    async fn fetch_states(&self) -> Result<Snapshot, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_transient() {
        assert!(FetchError::Timeout.is_transient());
        assert!(!FetchError::Http("connection refused".to_string()).is_transient());
        assert!(!FetchError::Status(401).is_transient());
        assert!(!FetchError::Decode("expected array".to_string()).is_transient());
    }
}

use std::result::Result as StdResult;
use thiserror::Error;

/// Failure to start, inspect or stop a test container.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("test container failed: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
}

pub type Result<T> = StdResult<T, TestInfraError>;

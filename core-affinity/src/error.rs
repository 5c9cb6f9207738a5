use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AffinityError {
    #[error("designated thread did not respond within {timeout:?}")]
    Unavailable { timeout: Duration },

    #[error("designated thread has shut down")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, AffinityError>;

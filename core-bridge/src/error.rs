use core_affinity::AffinityError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("an authentication attempt is already in progress")]
    AlreadyInProgress,

    #[error("authentication was cancelled")]
    Cancelled,

    #[error("provider error {code}: {message}")]
    Provider { code: i32, message: String },

    #[error("provider thread unavailable: {0}")]
    AffinityUnavailable(#[from] AffinityError),

    #[error("provider session is missing required field `{field}`")]
    MalformedSession { field: &'static str },
}

pub type Result<T> = std::result::Result<T, AuthError>;

//! Error taxonomy shared by every session operation.

/// Error codes reported for session failures.
pub mod codes {
    /// The call required a session but none was attached.
    pub const UNAUTHENTICATED: i32 = -32001;
    /// The referenced session does not exist (or no longer exists).
    pub const NOT_FOUND: i32 = -32002;
    /// Params did not match the declared shape.
    pub const INVALID_PARAMS: i32 = -32602;
}

/// Errors surfaced synchronously to the caller of a session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The operation needs a session and the request carried none.
    #[error("Authentication required: no session attached to this request")]
    Unauthenticated,

    /// The referenced session id does not match any live session.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Caller-supplied params did not match the expected shape.
    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

impl SessionError {
    /// Numeric code for this error.
    pub fn code(&self) -> i32 {
        match self {
            SessionError::Unauthenticated => codes::UNAUTHENTICATED,
            SessionError::NotFound(_) => codes::NOT_FOUND,
            SessionError::InvalidParams(_) => codes::INVALID_PARAMS,
        }
    }
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

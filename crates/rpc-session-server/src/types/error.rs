//! Error types and JSON-RPC error code mapping.

use rpc_session::SessionError;

use super::message::{JsonRpcError, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Session-service error codes (server-defined range).
pub mod session_error_codes {
    pub use rpc_session::error::codes::{NOT_FOUND, UNAUTHENTICATED};

    /// The session is not allowed to call an administrative method.
    pub const FORBIDDEN: i32 = -32003;
}

/// Errors raised while dispatching or serving requests.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Invalid JSON.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Not a valid JSON-RPC request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown method name.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Params did not match the declared shape.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Unexpected server-side failure.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Administrative method called without the admin permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure other than I/O.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RpcError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            RpcError::ParseError(_) => error_codes::PARSE_ERROR,
            RpcError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            RpcError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            RpcError::Forbidden(_) => session_error_codes::FORBIDDEN,
            RpcError::Session(e) => e.code(),
            RpcError::InternalError(_)
            | RpcError::Config(_)
            | RpcError::Io(_)
            | RpcError::Transport(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Convert into a JSON-RPC error response for request `id`.
    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.code(), self.to_string())
    }
}

/// Result alias for server operations.
pub type RpcResult<T> = Result<T, RpcError>;

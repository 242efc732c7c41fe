use bugless_common::{CodecError, FilterError, RpcStatus, StatusCode};
use futures::task::SpawnError;
use thiserror::Error;

/// A failed streaming call. Delivered to the caller as the terminal error event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    /// The server ended the call with a non-OK status.
    #[error("call failed with {code}: {message}")]
    Status {
        code: StatusCode,
        message: String,
    },

    /// The connection broke or could not be established.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server sent bytes that are not a valid frame.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RpcError {
    /// The status code that best describes this error.
    pub fn code(&self) -> StatusCode {
        match self {
            RpcError::Status { code, .. } => *code,
            RpcError::Transport(_) => StatusCode::Unavailable,
            RpcError::Codec(_) => StatusCode::Internal,
        }
    }
}

impl From<RpcStatus> for RpcError {
    fn from(status: RpcStatus) -> Self {
        RpcError::Status {
            code: status.code,
            message: status.message,
        }
    }
}

/// Reasons `QueryStreamController::query` refuses to start a stream.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The filter is malformed; no stream was opened.
    #[error("invalid query filter: {0}")]
    Filter(#[from] FilterError),

    /// The runtime would not accept the delivery task.
    #[error("could not start stream delivery: {0}")]
    Spawn(#[from] SpawnError),
}

/// Errors loading a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid client configuration: {0}")]
    Json(#[from] serde_json::Error),
}

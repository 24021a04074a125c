//! JSON encoding and decoding of task store payloads.

use serde::Serialize;

use crate::task::Task;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A request body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// A response body is not the expected JSON shape.
    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// Encodes a request body (a [`Task`] or
/// [`TaskFields`](crate::task::TaskFields)) as JSON bytes.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize + ?Sized>(body: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(body).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a single task from a response body.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the bytes are not a task object.
pub fn decode_task(bytes: &[u8]) -> Result<Task, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decodes a task list from a response body.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the bytes are not an array of tasks.
pub fn decode_task_list(bytes: &[u8]) -> Result<Vec<Task>, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}

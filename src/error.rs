//! Error types for the intelligence core.
//!
//! Only two failure classes reach the caller as errors:
//! - Transport: the AI call failed (network, quota, timeout). Surfaced to the
//!   initiating operation as-is, never retried here.
//! - Storage: the persistence primitive rejected a write, or a collection
//!   failed to serialize.
//!
//! Everything else in the taxonomy is recovered locally and never raised:
//! a missing delimiter block or unparsable JSON falls back to "unstructured
//! body only", a corrupt stored blob reads as an empty collection, and a
//! not-found update/delete returns a sentinel `None`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("AI transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Returns true if this is a transport failure the user may retry manually.
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Transport(_))
    }
}

/// Serializable error representation for presentation layers.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiError {
    pub message: String,
    pub can_retry: bool,
}

impl From<&CoreError> for UiError {
    fn from(err: &CoreError) -> Self {
        UiError {
            message: err.to_string(),
            can_retry: err.is_transport(),
        }
    }
}

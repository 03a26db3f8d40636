use serde::{Deserialize, Serialize};

/// Behaviour switches for a store backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Recompute the id of every object handed out by `read` and fail with
    /// `StoreError::HashMismatch` if it disagrees with the requested id.
    pub verify_on_read: bool,
    /// Reject every write with `StoreError::ReadOnly`.
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            verify_on_read: true,
            read_only: false,
        }
    }
}

impl StoreConfig {
    /// A configuration that serves reads but refuses all writes.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }
}

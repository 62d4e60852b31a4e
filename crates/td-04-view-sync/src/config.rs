//! # Synchronizer Configuration

/// View synchronizer configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Reject content that is empty after trimming before it reaches the
    /// ledger. The store itself only rejects the exact empty string.
    pub reject_blank_content: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reject_blank_content: true,
        }
    }
}

//! Stub configuration.
//!
//! `StubConfig` bundles the resource limits a single transaction is held
//! to. Defaults come from the shared constants in `worldstate-primitives`.

use worldstate_primitives::{MAX_KEY_LEN, MAX_PAGE_SIZE, MAX_VALUE_LEN};

/// Limits enforced by `MemStub` for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubConfig {
    /// Maximum key length in bytes.
    pub max_key_len: usize,
    /// Maximum value length in bytes.
    pub max_value_len: usize,
    /// Maximum total bytes (keys + values) a transaction may write.
    pub max_write_bytes: u64,
    /// Largest page a paginated scan may request.
    pub max_page_size: u32,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            max_key_len: MAX_KEY_LEN,
            max_value_len: MAX_VALUE_LEN,
            max_write_bytes: 16 * 1024 * 1024, // 16 MiB
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl StubConfig {
    /// Default limits with a custom write budget.
    pub fn with_write_budget(max_write_bytes: u64) -> Self {
        Self {
            max_write_bytes,
            ..Self::default()
        }
    }
}

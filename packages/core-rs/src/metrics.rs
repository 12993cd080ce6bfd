//! Process-wide byte accounting for the conversion paths.

use std::sync::atomic::{AtomicU64, Ordering};

static COPIED_BYTES: AtomicU64 = AtomicU64::new(0);
static ALIASED_BYTES: AtomicU64 = AtomicU64::new(0);

/// Counter values at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Bytes written into freshly allocated buffers.
    pub copied_bytes: u64,
    /// Bytes handed out through the zero-copy path instead of being copied.
    pub aliased_bytes: u64,
}

pub(crate) fn record_copy_bytes(bytes: usize) {
    COPIED_BYTES.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub(crate) fn record_aliased_bytes(bytes: usize) {
    ALIASED_BYTES.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn copy_bytes_total() -> u64 {
    COPIED_BYTES.load(Ordering::Relaxed)
}

pub fn aliased_bytes_total() -> u64 {
    ALIASED_BYTES.load(Ordering::Relaxed)
}

pub fn snapshot() -> TransferStats {
    TransferStats {
        copied_bytes: copy_bytes_total(),
        aliased_bytes: aliased_bytes_total(),
    }
}

/// Zero both counters.
pub fn reset() {
    COPIED_BYTES.store(0, Ordering::Relaxed);
    ALIASED_BYTES.store(0, Ordering::Relaxed);
}

/// Shared-use counter carried by GPU buffers
///
/// Every `SubMesh` holding a buffer increments its counter on creation and
/// decrements it on destruction. The count never goes below zero:
/// decrementing an unreferenced counter is an error and leaves it at zero.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct ReferenceCounter {
    count: AtomicU32,
}

impl ReferenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reference, returning the new count
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drop one reference, returning the new count
    pub fn decrement(&self) -> Result<u32> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1))
            .map(|previous| previous - 1)
            .map_err(|_| {
                Error::ReferenceCount("Reference Counter is negative".to_string())
                    .logged("prism3d::ReferenceCounter")
            })
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_referenced(&self) -> bool {
        self.count() > 0
    }
}

/// Process-unique identity of a GPU resource or material
///
/// The renderer compares these to decide whether a bind can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
#[path = "reference_counter_tests.rs"]
mod tests;

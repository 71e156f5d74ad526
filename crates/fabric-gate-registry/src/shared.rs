// crates/fabric-gate-registry/src/shared.rs
// ============================================================================
// Module: Shared Snapshots
// Description: Single-writer/many-reader atomic snapshot swapping.
// Purpose: Let reloads replace registry and guidance state without torn reads.
// Dependencies: fabric-gate-core
// ============================================================================

//! ## Overview
//! Registry and guidance state are read on every call and replaced rarely.
//! [`SharedSnapshot`] holds an `Arc` behind an `RwLock`: readers clone the
//! `Arc` and keep observing the snapshot they started with, while a reload
//! swaps in a fully built replacement under the write lock. A reload in
//! progress never blocks reads of the prior snapshot beyond the pointer
//! swap itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::RwLock;

use fabric_gate_core::GuidanceSnapshot;

use crate::snapshot::RegistrySnapshot;

// ============================================================================
// SECTION: Shared Snapshot
// ============================================================================

/// Atomically swapped shared snapshot pointer.
///
/// # Invariants
/// - Readers receive a consistent, fully built snapshot; partial updates are
///   never visible.
/// - Writers replace the whole snapshot; there is no in-place mutation.
#[derive(Debug)]
pub struct SharedSnapshot<T> {
    /// Current snapshot pointer.
    inner: RwLock<Arc<T>>,
}

impl<T> SharedSnapshot<T> {
    /// Creates a shared pointer holding the initial snapshot.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: RwLock::new(Arc::new(initial)),
        }
    }

    /// Returns the current snapshot.
    ///
    /// The returned `Arc` stays valid for the caller even if a reload swaps
    /// the shared pointer concurrently.
    #[must_use]
    pub fn snapshot(&self) -> Arc<T> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Atomically replaces the snapshot, returning the previous one.
    pub fn replace(&self, next: T) -> Arc<T> {
        let next = Arc::new(next);
        match self.inner.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                std::mem::replace(&mut *guard, next)
            }
        }
    }
}

impl<T: Default> Default for SharedSnapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Shared operation registry pointer.
pub type SharedRegistry = SharedSnapshot<RegistrySnapshot>;

/// Shared guidance override pointer.
pub type SharedGuidance = SharedSnapshot<GuidanceSnapshot>;

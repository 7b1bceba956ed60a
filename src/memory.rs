//! # Memory Admission
//!
//! This module provides allocation admission and accounting for tree
//! nodes. Every node allocation is submitted to an [`AllocGate`] before it
//! happens; a refused admission aborts the surrounding operation, which
//! reports the failure through the tree's sticky `oom` flag and leaves the
//! tree exactly as it was.
//!
//! ## Enforcement Model
//!
//! [`MemoryBudget`] implements **hard limits**: admissions that would push
//! accounted usage past the limit are refused rather than queued or
//! degraded. This is the safest behavior for embedded and
//! memory-constrained deployments where exhaustion is fatal, and it makes
//! the failure mode transient: freeing nodes (or raising the limit) lets
//! the caller retry the exact same operation.
//!
//! ## Accounting Flow
//!
//! ```text
//! node allocation ──> AllocGate::admit(bytes) ──true──> NodeCharge (RAII)
//!                              │                             │
//!                            false                      node dropped
//!                              │                             │
//!                     operation aborts,          AllocGate::release(bytes)
//!                     tree unchanged,
//!                     oom flag set
//! ```
//!
//! A [`NodeCharge`] rides inside each node, so releases happen wherever
//! the node is freed: a merge that discards its right sibling, a root
//! collapse, a clone dropping the last reference to a shared subtree, or
//! whole-tree teardown.
//!
//! ## Sharing
//!
//! Gates are held behind `Arc` and shared by every clone of a tree, so a
//! budget bounds a whole family of snapshots rather than each snapshot
//! separately. Shared subtrees are charged once; copy-on-write duplicates
//! are charged as they are created.
//!
//! ## Thread Safety
//!
//! Gate implementations must be `Send + Sync`. [`MemoryBudget`] uses
//! atomic counters and can be shared freely.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Admission control for node allocations.
pub trait AllocGate: Send + Sync {
    /// Asks to reserve `bytes`. Returning `false` refuses the allocation.
    fn admit(&self, bytes: usize) -> bool;

    /// Returns a previously admitted reservation.
    fn release(&self, bytes: usize);
}

/// Gate that admits everything. The default when no budget is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl AllocGate for Unbounded {
    #[inline]
    fn admit(&self, _bytes: usize) -> bool {
        true
    }

    #[inline]
    fn release(&self, _bytes: usize) {}
}

/// Hard-limit byte budget for node memory.
#[derive(Debug)]
pub struct MemoryBudget {
    limit: AtomicUsize,
    used: AtomicUsize,
}

impl MemoryBudget {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: AtomicUsize::new(limit),
            used: AtomicUsize::new(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::Relaxed)
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.used())
    }

    /// Raises or lowers the limit. Lowering below current usage refuses
    /// new admissions until enough nodes are freed.
    pub fn set_limit(&self, limit: usize) {
        self.limit.store(limit, Ordering::Relaxed);
    }
}

impl AllocGate for MemoryBudget {
    fn admit(&self, bytes: usize) -> bool {
        let limit = self.limit.load(Ordering::Relaxed);
        let mut used = self.used.load(Ordering::Relaxed);
        loop {
            let next = match used.checked_add(bytes) {
                Some(next) if next <= limit => next,
                _ => return false,
            };
            match self
                .used
                .compare_exchange_weak(used, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(current) => used = current,
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::Relaxed);
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} bytes", self.used(), self.limit())
    }
}

/// RAII reservation held by a node for its lifetime.
pub(crate) struct NodeCharge {
    gate: Arc<dyn AllocGate>,
    bytes: usize,
}

impl NodeCharge {
    pub(crate) fn admit(gate: &Arc<dyn AllocGate>, bytes: usize) -> Option<Self> {
        gate.admit(bytes).then(|| Self {
            gate: Arc::clone(gate),
            bytes,
        })
    }
}

impl Drop for NodeCharge {
    fn drop(&mut self) {
        self.gate.release(self.bytes);
    }
}

impl fmt::Debug for NodeCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCharge").field("bytes", &self.bytes).finish()
    }
}

//! # bough - Copy-on-Write B-Tree
//!
//! `bough` is an in-memory ordered collection organized as a B-tree. It
//! stores items of any type under a caller-supplied total order and
//! provides point lookup, insertion with replace semantics, deletion,
//! ordered traversal from arbitrary pivots, bulk append, a stateful
//! cursor, and constant-time snapshot cloning with structural sharing.
//!
//! ## Quick Start
//!
//! ```
//! use bough::BTree;
//!
//! let mut tree = BTree::new();
//! tree.set(3);
//! tree.set(1);
//! tree.set(2);
//!
//! assert_eq!(tree.get(&2), Some(&2));
//! assert_eq!(tree.min(), Some(&1));
//! assert_eq!(tree.count(), 3);
//!
//! let snapshot = tree.clone(); // O(1), shares every node
//! tree.delete(&2);
//! assert_eq!(snapshot.count(), 3);
//! assert_eq!(tree.count(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   Tree Façade (set/get/delete/load/…)   │
//! ├───────────────┬─────────────┬───────────┤
//! │ Mutation Core │  Traversal  │  Cursor   │
//! ├───────────────┴─────────────┴───────────┤
//! │   In-Node Search (plain + path hints)   │
//! ├─────────────────────────────────────────┤
//! │  Node Layout + Copy-on-Write Refcounts  │
//! ├─────────────────────────────────────────┤
//! │  Memory Admission (gates and budgets)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Snapshots
//!
//! `Clone` takes a reference-counted snapshot instead of copying data.
//! The original and the clone then behave as fully independent trees:
//! writes duplicate only the nodes along their own root-to-leaf path,
//! and subtrees neither side has touched stay shared. Snapshots may be
//! moved to other threads; the reference counts are atomic and that is
//! the only state clones share.
//!
//! ## Ordering
//!
//! Trees over `T: Ord` work out of the box. Anything else takes a
//! comparator, either a closure or a [`Comparator`] implementation:
//!
//! ```
//! use bough::BTreeBuilder;
//!
//! let mut by_len = BTreeBuilder::new()
//!     .comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b)))
//!     .build();
//! by_len.set("pear");
//! by_len.set("fig");
//! assert_eq!(by_len.min(), Some(&"fig"));
//! ```
//!
//! ## Memory Limits
//!
//! Node allocations pass through an [`AllocGate`]. The default admits
//! everything; a [`MemoryBudget`] enforces a hard byte limit shared by a
//! tree and all of its snapshots. A refused allocation aborts the
//! operation, leaves the tree untouched, and latches the tree's `oom`
//! flag until the next mutating call; retrying after freeing space
//! succeeds.
//!
//! ## Degree
//!
//! The builder's `degree` is the maximum child count per node; nodes
//! hold up to `2 * degree - 1` items and split, merge, or rotate to stay
//! above half full. The default degree of 128 suits most workloads;
//! smaller degrees make deeper trees and are mainly useful in tests.
//!
//! ## Module Overview
//!
//! - [`btree`]: the tree engine, traversal, and cursor
//! - [`compare`]: comparator trait and adapters
//! - [`memory`]: allocation gates and budgets
//! - [`config`]: fan-out and hint constants

pub mod btree;
pub mod compare;
pub mod config;
pub mod memory;

pub use btree::{Action, BTree, BTreeBuilder, Iter, PathHint};
pub use compare::{Comparator, NaturalOrder};
pub use memory::{AllocGate, MemoryBudget, Unbounded};

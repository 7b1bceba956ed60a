//! # B-Tree Engine
//!
//! This module implements the tree engine behind the crate: node layout
//! and copy-on-write, in-node search with path hints, the recursive
//! mutation core, ordered traversal, and the stateful cursor.
//!
//! ## Node Shape
//!
//! A node stores up to `2 * degree - 1` items in sorted order; a branch
//! stores one more child pointer than items. Both arrays are allocated
//! at full capacity when the node is created, so structural edits shift
//! slots in place and never reallocate.
//!
//! ```text
//!                 [ 30 | 60 ]                ← branch: items + children
//!                /     |     \
//!        [10|20]   [40|50]   [70|80|90]     ← leaves: items only
//! ```
//!
//! Every item in a child left of a separator sorts below it; every item
//! to the right sorts above it. All leaves sit at the same depth, which
//! the tree records as its height.
//!
//! ## Copy-on-Write Snapshots
//!
//! Cloning a tree is O(1): the clone takes a reference to the same root.
//! Nodes are reference counted; a node referenced by more than one owner
//! is immutable, and any mutation reaching it first swaps in a private
//! copy that shares the children of the original. Only the root-to-leaf
//! path a write actually touches is ever duplicated, so a snapshot costs
//! nothing until either side diverges, and independent snapshots can be
//! handed to other threads.
//!
//! ## Search Hints
//!
//! Lookups optionally carry a [`PathHint`]: one byte of remembered slot
//! index per tree level. Clustered and sequential access patterns
//! resolve most levels with a single comparison against the remembered
//! slot. Hints never change results, only comparison counts.
//!
//! ## Module Layout
//!
//! - `node`: node allocation, slot primitives, splits, and the
//!   copy-on-write protocol
//! - `search`: plain and hinted in-node bisection
//! - `tree`: the mutation core and the public façade
//! - `scan`: ordered traversal and action iteration
//! - `iter`: the stateful cursor
//! - `verify`: whole-tree structural audit

mod iter;
mod node;
mod scan;
mod search;
mod tree;
mod verify;

#[cfg(test)]
mod clone_tests;

pub use iter::Iter;
pub use scan::Action;
pub use search::PathHint;
pub use tree::{BTree, BTreeBuilder};

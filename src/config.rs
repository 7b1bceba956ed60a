//! # Configuration Constants
//!
//! This module centralizes the fan-out and search-hint constants, grouping
//! interdependent values together and documenting their relationships.
//! Constants that depend on each other are co-located to prevent mismatch
//! bugs.
//!
//! ## Dependency Graph
//!
//! ```text
//! DEFAULT_DEGREE (128)
//!       │
//!       └─> default node capacity = 2*128 - 1 = 255 items
//!
//! MIN_DEGREE (2) ──> MIN_NODE_ITEMS (3)
//! MAX_DEGREE (1023) ──> MAX_NODE_ITEMS (2045)
//!       │
//!       └─> A node's item capacity is always 2*degree - 1, which is odd.
//!           An odd capacity means a balanced split of a full node leaves
//!           both halves holding exactly capacity/2 items, so a split can
//!           never produce an under-filled sibling.
//!
//! HINT_DEPTH (8)
//!       │
//!       └─> A path hint is one byte per tree level. Eight levels cover
//!           any realistic tree at the default degree (255^8 items);
//!           deeper levels simply ignore the hint.
//! ```
//!
//! ## Degree Convention
//!
//! The builder parameter is a *degree*: the maximum number of children an
//! interior node may have. Item capacity and the rebalance threshold are
//! derived:
//!
//! - `max_items = 2 * degree - 1`
//! - `min_items = max_items / 2`
//!
//! Degrees outside `[MIN_DEGREE, MAX_DEGREE]` are clamped rather than
//! rejected.
//!
//! ## Critical Invariants
//!
//! These invariants are enforced by compile-time assertions:
//!
//! 1. `MIN_NODE_ITEMS == 2 * MIN_DEGREE - 1`
//! 2. `MAX_NODE_ITEMS == 2 * MAX_DEGREE - 1`
//! 3. `MIN_DEGREE <= DEFAULT_DEGREE && DEFAULT_DEGREE <= MAX_DEGREE`

/// Degree used when the builder does not specify one.
pub const DEFAULT_DEGREE: usize = 128;

/// Smallest accepted degree. Two children per node is the thinnest shape
/// that still splits and merges.
pub const MIN_DEGREE: usize = 2;

/// Largest accepted degree. There must be a reasonable limit.
pub const MAX_DEGREE: usize = 1023;

/// Item capacity of a node built with `MIN_DEGREE`.
pub const MIN_NODE_ITEMS: usize = 2 * MIN_DEGREE - 1;

/// Item capacity of a node built with `MAX_DEGREE`.
pub const MAX_NODE_ITEMS: usize = 2 * MAX_DEGREE - 1;

/// Number of tree levels a search hint can remember, one byte per level.
pub const HINT_DEPTH: usize = 8;

const _: () = assert!(MIN_NODE_ITEMS == 3);
const _: () = assert!(MAX_NODE_ITEMS == 2045);
const _: () = assert!(MIN_DEGREE <= DEFAULT_DEGREE && DEFAULT_DEGREE <= MAX_DEGREE);

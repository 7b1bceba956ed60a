//! # Node Layout and Copy-on-Write
//!
//! A node is either a leaf (items only) or a branch (items plus one more
//! child than items). Both vectors are allocated once, at full capacity,
//! when the node is created, so slot edits during splits, merges, and
//! rotations never reallocate mid-operation.
//!
//! ## Reference Counting
//!
//! Nodes live behind `Arc`. A strong count of one means the node is owned
//! solely by its parent (or by the tree root slot) and may be edited in
//! place. A higher count means the node is shared with at least one other
//! tree snapshot and is immutable; [`cow_mut`] replaces it with a private
//! copy before handing out a mutable reference.
//!
//! The copy is one level deep: items are cloned, child pointers are
//! `Arc`-cloned. Shared subtrees below the copied node stay shared, so a
//! mutation duplicates only the nodes on its root-to-leaf path. `Arc`
//! gives the drop path the ordering the sharing model needs: the
//! decrement is a release, the deallocating observation an acquire, so
//! the final owner sees every prior edit before freeing.
//!
//! ## Split Variants
//!
//! A full node splits around a pivot whose item is promoted to the
//! parent. Two pivots exist:
//!
//! - **balanced** (`max_items / 2`): both halves end at `min_items`; used
//!   by ordinary inserts and deletes.
//! - **lean-left** (`max_items - min_items`): the left node keeps as many
//!   items as possible and the fresh right sibling is left one short of
//!   `min_items`, counting on the pending append to land there. Bulk
//!   ascending loads settle leaves at `max_items - min_items` instead of
//!   half full, roughly halving the number of splits. Callers take this
//!   pivot only when the pending item sorts above the candidate median.
//!
//! ## Allocation
//!
//! Node construction and copy-on-write both go through the tree's
//! [`AllocGate`](crate::memory::AllocGate); a refused admission surfaces
//! as [`NoMem`] and unwinds without touching the tree.

use std::sync::Arc;

use crate::memory::{AllocGate, NodeCharge};

/// An allocation was refused by the gate. Carried to the tree façade,
/// which reports it through the sticky `oom` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NoMem;

/// Per-operation context: the comparator, the allocation gate, and the
/// derived fan-out bounds, split-borrowed from the tree so node routines
/// can hold them alongside mutable node references.
pub(crate) struct OpCx<'a, C> {
    pub(crate) cmp: &'a C,
    pub(crate) gate: &'a Arc<dyn AllocGate>,
    pub(crate) max_items: usize,
    pub(crate) min_items: usize,
}

pub(crate) struct Node<T> {
    pub(crate) leaf: bool,
    pub(crate) items: Vec<T>,
    pub(crate) children: Vec<Arc<Node<T>>>,
    _charge: NodeCharge,
}

impl<T> Node<T> {
    pub(crate) fn new<C>(cx: &OpCx<'_, C>, leaf: bool) -> Result<Self, NoMem> {
        let bytes = Self::charge_bytes(cx.max_items, leaf);
        let charge = NodeCharge::admit(cx.gate, bytes).ok_or(NoMem)?;
        Ok(Self {
            leaf,
            items: Vec::with_capacity(cx.max_items),
            children: if leaf {
                Vec::new()
            } else {
                Vec::with_capacity(cx.max_items + 1)
            },
            _charge: charge,
        })
    }

    fn charge_bytes(max_items: usize, leaf: bool) -> usize {
        let header = std::mem::size_of::<Self>();
        let items = max_items * std::mem::size_of::<T>();
        let children = if leaf {
            0
        } else {
            (max_items + 1) * std::mem::size_of::<Arc<Self>>()
        };
        header + items + children
    }

    /// One-level-deep copy: items cloned, children shared.
    pub(crate) fn shallow_copy<C>(&self, cx: &OpCx<'_, C>) -> Option<Self>
    where
        T: Clone,
    {
        let bytes = Self::charge_bytes(cx.max_items, self.leaf);
        let charge = NodeCharge::admit(cx.gate, bytes)?;
        let mut items = Vec::with_capacity(cx.max_items);
        items.extend(self.items.iter().cloned());
        let mut children = if self.leaf {
            Vec::new()
        } else {
            Vec::with_capacity(cx.max_items + 1)
        };
        children.extend(self.children.iter().cloned());
        Some(Self {
            leaf: self.leaf,
            items,
            children,
            _charge: charge,
        })
    }

    /// Splits a full node around the chosen pivot. The pivot item is
    /// removed and returned as the median to promote; everything above it
    /// moves to a fresh right sibling.
    pub(crate) fn split<C>(
        &mut self,
        cx: &OpCx<'_, C>,
        lean_left: bool,
    ) -> Result<(T, Arc<Self>), NoMem> {
        let mid = if lean_left {
            cx.max_items - cx.min_items
        } else {
            cx.max_items / 2
        };
        let mut right = Node::new(cx, self.leaf)?;
        let median = self.items.remove(mid);
        right.items.extend(self.items.drain(mid..));
        if !self.leaf {
            right.children.extend(self.children.drain(mid + 1..));
        }
        Ok((median, Arc::new(right)))
    }

    pub(crate) fn is_full(&self, max_items: usize) -> bool {
        self.items.len() == max_items
    }
}

/// Grants mutable access to the node behind `link`, copying it first if
/// it is shared with another snapshot.
pub(crate) fn cow_mut<'a, T, C>(
    cx: &OpCx<'_, C>,
    link: &'a mut Arc<Node<T>>,
) -> Result<&'a mut Node<T>, NoMem>
where
    T: Clone,
{
    if Arc::strong_count(link) > 1 {
        let copy = link.shallow_copy(cx).ok_or(NoMem)?;
        *link = Arc::new(copy);
    }
    Ok(unshared(link))
}

/// Mutable access to a node already known to be exclusively owned.
pub(crate) fn unshared<T>(link: &mut Arc<Node<T>>) -> &mut Node<T> {
    Arc::get_mut(link).expect("node is exclusively owned after copy-on-write")
}

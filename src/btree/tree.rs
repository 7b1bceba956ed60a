//! # Tree Core
//!
//! This module implements the tree façade and the recursive mutation
//! engine: search-guided insertion with node splitting, deletion with
//! rebalancing, the pop fast paths, bulk append, and O(1) snapshot
//! cloning.
//!
//! ## Insert Algorithm
//!
//! ```text
//! 1. Copy-on-write the root, then descend by in-node search
//! 2. Replace in place when the key already exists
//! 3. At a non-full leaf: shift and insert
//! 4. At a full leaf: report "must split" to the parent
//! 5. The parent splits the child (if the parent itself is full, the
//!    report keeps propagating up), plants the promoted median and the
//!    new right sibling, and retries the insert at the same level: the
//!    item now belongs to one of the two halves
//! 6. When the root itself must split, a new root is allocated above it
//!    and the height grows by one
//! ```
//!
//! ## Delete Algorithm
//!
//! Deletion runs one of four actions through the same descent: delete a
//! key, pop the front, pop the back, or pop the maximum of a subtree.
//! Removing a key that lives in a branch swaps in the predecessor popped
//! from the left child. After any child returns from a removal, the
//! parent checks it against `min_items` and rebalances around the
//! separator when it ran thin:
//!
//! - both siblings together fit in one node: merge them around the
//!   separator and drop the right node
//! - otherwise rotate one slot from the fuller sibling through the
//!   separator
//!
//! Because rebalancing touches both siblings, the descent copy-on-writes
//! the visited child *and* its rebalance neighbour before recursing.
//!
//! An empty root after deletion collapses: a branch root is replaced by
//! its only child, a leaf root by nothing, shrinking the height.
//!
//! ## Pop Fast Paths
//!
//! `pop_min` and `pop_max` first walk straight down the first-child (or
//! last-child) spine. If the target leaf holds more than `min_items`, the
//! edge item comes off in place with no rebalancing possible. Thin leaves
//! fall back to the generic delete descent.
//!
//! ## Bulk Append
//!
//! `load` optimizes the sorted-insert workload. It walks the rightmost
//! spine; when the item is strictly greater than the rightmost leaf's
//! last item and the leaf has room, the item is appended directly. Any
//! other shape falls back to a generic insert that splits with the
//! lean-left pivot, settling leaves near `max_items - min_items` full
//! instead of half full.
//!
//! ## Out-of-Memory Discipline
//!
//! Every node allocation may be refused by the configured gate. A refusal
//! unwinds the mutation before any structural change the allocation was
//! for, sets the sticky `oom` flag (cleared at the start of the next
//! mutating call), and reports "no previous value". The failed operation
//! can simply be retried.
//!
//! ## Thread Safety
//!
//! A tree is a single-writer structure. Clones are independent snapshots
//! and may be used from other threads; the only cross-thread interaction
//! is reference-count arithmetic on shared nodes.

use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::btree::node::{cow_mut, unshared, NoMem, Node, OpCx};
use crate::btree::search::{self, PathHint};
use crate::compare::{Comparator, NaturalOrder};
use crate::config::{DEFAULT_DEGREE, MAX_DEGREE, MIN_DEGREE};
use crate::memory::{AllocGate, Unbounded};

/// Ordered collection of items with copy-on-write snapshots.
pub struct BTree<T, C = NaturalOrder> {
    pub(crate) cmp: C,
    pub(crate) gate: Arc<dyn AllocGate>,
    pub(crate) root: Option<Arc<Node<T>>>,
    pub(crate) count: usize,
    pub(crate) height: usize,
    pub(crate) max_items: usize,
    pub(crate) min_items: usize,
    pub(crate) oom: bool,
}

/// Configures and builds a [`BTree`].
pub struct BTreeBuilder<C = NaturalOrder> {
    degree: usize,
    comparator: C,
    gate: Option<Arc<dyn AllocGate>>,
}

impl BTreeBuilder<NaturalOrder> {
    pub fn new() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            comparator: NaturalOrder,
            gate: None,
        }
    }
}

impl Default for BTreeBuilder<NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> BTreeBuilder<C> {
    /// Maximum number of children per node. Clamped to the supported
    /// range; item capacity becomes `2 * degree - 1`.
    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    pub fn comparator<C2>(self, comparator: C2) -> BTreeBuilder<C2> {
        BTreeBuilder {
            degree: self.degree,
            comparator,
            gate: self.gate,
        }
    }

    /// Installs an allocation gate. Clones of the built tree share it.
    pub fn budget(mut self, gate: Arc<dyn AllocGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn build<T>(self) -> BTree<T, C>
    where
        C: Comparator<T>,
    {
        let degree = self.degree.clamp(MIN_DEGREE, MAX_DEGREE);
        let max_items = 2 * degree - 1;
        BTree {
            cmp: self.comparator,
            gate: self.gate.unwrap_or_else(|| Arc::new(Unbounded)),
            root: None,
            count: 0,
            height: 0,
            max_items,
            min_items: max_items / 2,
            oom: false,
        }
    }
}

enum SetStep<T> {
    Inserted,
    Replaced(T),
    MustSplit(T),
}

enum DeleteType<'k, T> {
    Key(&'k T),
    PopFront,
    PopBack,
    PopMax,
}

impl<T> Clone for DeleteType<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DeleteType<'_, T> {}

impl<T: Ord> BTree<T> {
    /// Tree over `T`'s natural order with the default degree. Use
    /// [`BTreeBuilder`] to pick a degree, comparator, or budget.
    pub fn new() -> Self {
        BTreeBuilder::new().build()
    }
}

impl<T: Ord> Default for BTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> BTree<T, C> {
    pub(crate) fn parts(
        &mut self,
    ) -> (
        OpCx<'_, C>,
        &mut Option<Arc<Node<T>>>,
        &mut usize,
        &mut usize,
    ) {
        (
            OpCx {
                cmp: &self.cmp,
                gate: &self.gate,
                max_items: self.max_items,
                min_items: self.min_items,
            },
            &mut self.root,
            &mut self.count,
            &mut self.height,
        )
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the most recent mutating call failed for lack of memory.
    /// Cleared at the start of the next mutating call.
    pub fn oom(&self) -> bool {
        self.oom
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.count = 0;
        self.height = 0;
        self.oom = false;
    }

    pub fn get(&self, key: &T) -> Option<&T> {
        self.get_apply(key, None)
    }

    pub fn get_hint(&self, key: &T, hint: &mut PathHint) -> Option<&T> {
        self.get_apply(key, Some(hint))
    }

    fn get_apply(&self, key: &T, mut hint: Option<&mut PathHint>) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        let mut depth = 0;
        loop {
            let (found, i) = search::search(&self.cmp, &node.items, key, hint.as_deref_mut(), depth);
            if found {
                return Some(&node.items[i]);
            }
            if node.leaf {
                return None;
            }
            node = node.children[i].as_ref();
            depth += 1;
        }
    }

    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        loop {
            if node.leaf {
                return node.items.first();
            }
            node = node.children.first()?.as_ref();
        }
    }

    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        loop {
            if node.leaf {
                return node.items.last();
            }
            node = node.children.last()?.as_ref();
        }
    }
}

impl<T, C> BTree<T, C>
where
    T: Clone,
    C: Comparator<T>,
{
    /// Inserts `item`, returning the previous item with an equal key if
    /// one was replaced. Returns `None` and sets the `oom` flag when an
    /// allocation was refused; the item is dropped in that case.
    pub fn set(&mut self, item: T) -> Option<T> {
        self.set_apply(item, None, false)
    }

    pub fn set_hint(&mut self, item: T, hint: &mut PathHint) -> Option<T> {
        self.set_apply(item, Some(hint), false)
    }

    fn set_apply(&mut self, item: T, hint: Option<&mut PathHint>, lean_left: bool) -> Option<T> {
        self.oom = false;
        match self.try_set(item, hint, lean_left) {
            Ok(prev) => prev,
            Err(NoMem) => {
                self.oom = true;
                None
            }
        }
    }

    fn try_set(
        &mut self,
        mut item: T,
        mut hint: Option<&mut PathHint>,
        lean_left: bool,
    ) -> Result<Option<T>, NoMem> {
        let (cx, root, count, height) = self.parts();
        let Some(root_link) = root.as_mut() else {
            let mut node = Node::new(&cx, true)?;
            node.items.push(item);
            *root = Some(Arc::new(node));
            *count += 1;
            *height += 1;
            return Ok(None);
        };
        loop {
            let root_mut = cow_mut(&cx, root_link)?;
            match node_set(&cx, root_mut, item, hint.as_deref_mut(), 0, lean_left)? {
                SetStep::Replaced(prev) => return Ok(Some(prev)),
                SetStep::Inserted => {
                    *count += 1;
                    return Ok(None);
                }
                SetStep::MustSplit(pending) => {
                    item = pending;
                    let mut new_root = Node::new(&cx, false)?;
                    let lean = lean_left && leans_right(&cx, root_mut, &item);
                    let (median, right) = root_mut.split(&cx, lean)?;
                    new_root.items.push(median);
                    let old_root = mem::replace(root_link, Arc::new(new_root));
                    let top = unshared(root_link);
                    top.children.push(old_root);
                    top.children.push(right);
                    *height += 1;
                }
            }
        }
    }

    /// Removes the item whose key equals `key`, returning it.
    pub fn delete(&mut self, key: &T) -> Option<T> {
        self.delete_apply(DeleteType::Key(key), None)
    }

    pub fn delete_hint(&mut self, key: &T, hint: &mut PathHint) -> Option<T> {
        self.delete_apply(DeleteType::Key(key), Some(hint))
    }

    fn delete_apply(&mut self, act: DeleteType<'_, T>, hint: Option<&mut PathHint>) -> Option<T> {
        self.oom = false;
        match self.try_delete(act, hint) {
            Ok(prev) => prev,
            Err(NoMem) => {
                self.oom = true;
                None
            }
        }
    }

    fn try_delete(
        &mut self,
        act: DeleteType<'_, T>,
        hint: Option<&mut PathHint>,
    ) -> Result<Option<T>, NoMem> {
        let (cx, root, count, height) = self.parts();
        let Some(root_link) = root.as_mut() else {
            return Ok(None);
        };
        let root_mut = cow_mut(&cx, root_link)?;
        let Some(prev) = node_delete(&cx, root_mut, act, hint, 0)? else {
            return Ok(None);
        };
        if root_mut.items.is_empty() {
            if let Some(mut old_root) = root.take() {
                if !old_root.leaf {
                    let promoted = unshared(&mut old_root).children.remove(0);
                    *root = Some(promoted);
                }
                *height -= 1;
            }
        }
        *count -= 1;
        Ok(Some(prev))
    }

    pub fn pop_min(&mut self) -> Option<T> {
        self.oom = false;
        match self.try_pop(true) {
            Ok(prev) => prev,
            Err(NoMem) => {
                self.oom = true;
                None
            }
        }
    }

    pub fn pop_max(&mut self) -> Option<T> {
        self.oom = false;
        match self.try_pop(false) {
            Ok(prev) => prev,
            Err(NoMem) => {
                self.oom = true;
                None
            }
        }
    }

    fn try_pop(&mut self, front: bool) -> Result<Option<T>, NoMem> {
        {
            let (cx, root, count, _height) = self.parts();
            if let Some(root_link) = root.as_mut() {
                let mut node = cow_mut(&cx, root_link)?;
                loop {
                    if node.leaf {
                        // An edge removal from a leaf above the minimum
                        // cannot trigger rebalancing anywhere.
                        if node.items.len() > cx.min_items {
                            let i = if front { 0 } else { node.items.len() - 1 };
                            let item = node.items.remove(i);
                            *count -= 1;
                            return Ok(Some(item));
                        }
                        break;
                    }
                    let i = if front { 0 } else { node.children.len() - 1 };
                    let branch = node;
                    node = cow_mut(&cx, &mut branch.children[i])?;
                }
            }
        }
        self.try_delete(
            if front {
                DeleteType::PopFront
            } else {
                DeleteType::PopBack
            },
            None,
        )
    }

    /// Inserts with a fast path for items greater than the current
    /// maximum. Sorted input appends at the rightmost leaf in amortized
    /// constant time and splits lean-left; anything else degrades to an
    /// ordinary insert.
    pub fn load(&mut self, item: T) -> Option<T> {
        self.oom = false;
        match self.try_load(item) {
            Ok(prev) => prev,
            Err(NoMem) => {
                self.oom = true;
                None
            }
        }
    }

    fn try_load(&mut self, item: T) -> Result<Option<T>, NoMem> {
        {
            let (cx, root, count, _height) = self.parts();
            if let Some(root_link) = root.as_mut() {
                let mut node = cow_mut(&cx, root_link)?;
                loop {
                    if node.leaf {
                        if node.is_full(cx.max_items) {
                            break;
                        }
                        match node.items.last() {
                            Some(last) if cx.cmp.compare(&item, last).is_gt() => {
                                node.items.push(item);
                                *count += 1;
                                return Ok(None);
                            }
                            _ => break,
                        }
                    }
                    let i = node.children.len() - 1;
                    let branch = node;
                    node = cow_mut(&cx, &mut branch.children[i])?;
                }
            }
        }
        self.try_set(item, None, true)
    }
}

/// The lean-left pivot is only worth taking when the pending item will
/// land in the thin right sibling; otherwise the sibling would stay
/// under the minimum.
fn leans_right<T, C: Comparator<T>>(cx: &OpCx<'_, C>, full: &Node<T>, pending: &T) -> bool {
    let pivot = cx.max_items - cx.min_items;
    cx.cmp.compare(pending, &full.items[pivot]).is_gt()
}

fn node_set<T, C>(
    cx: &OpCx<'_, C>,
    node: &mut Node<T>,
    mut item: T,
    mut hint: Option<&mut PathHint>,
    depth: usize,
    lean_left: bool,
) -> Result<SetStep<T>, NoMem>
where
    T: Clone,
    C: Comparator<T>,
{
    loop {
        let (found, i) = search::search(cx.cmp, &node.items, &item, hint.as_deref_mut(), depth);
        if found {
            let prev = mem::replace(&mut node.items[i], item);
            return Ok(SetStep::Replaced(prev));
        }
        if node.leaf {
            if node.is_full(cx.max_items) {
                return Ok(SetStep::MustSplit(item));
            }
            node.items.insert(i, item);
            return Ok(SetStep::Inserted);
        }
        let child = cow_mut(cx, &mut node.children[i])?;
        match node_set(cx, child, item, hint.as_deref_mut(), depth + 1, lean_left)? {
            SetStep::MustSplit(pending) => {
                if node.is_full(cx.max_items) {
                    return Ok(SetStep::MustSplit(pending));
                }
                let lean = lean_left && leans_right(cx, &node.children[i], &pending);
                let full = cow_mut(cx, &mut node.children[i])?;
                let (median, right) = full.split(cx, lean)?;
                node.items.insert(i, median);
                node.children.insert(i + 1, right);
                // Retry at this level: the item belongs to one of the
                // two halves now.
                item = pending;
            }
            done => return Ok(done),
        }
    }
}

/// Copy-on-writes the child at `i` and the neighbour a rebalance around
/// separator `i` would touch, then returns the child mutably.
fn cow_pair<'n, T, C>(
    cx: &OpCx<'_, C>,
    node: &'n mut Node<T>,
    i: usize,
) -> Result<&'n mut Node<T>, NoMem>
where
    T: Clone,
{
    cow_mut(cx, &mut node.children[i])?;
    let neighbour = if i == node.items.len() { i - 1 } else { i + 1 };
    cow_mut(cx, &mut node.children[neighbour])?;
    cow_mut(cx, &mut node.children[i])
}

fn node_delete<T, C>(
    cx: &OpCx<'_, C>,
    node: &mut Node<T>,
    act: DeleteType<'_, T>,
    mut hint: Option<&mut PathHint>,
    depth: usize,
) -> Result<Option<T>, NoMem>
where
    T: Clone,
    C: Comparator<T>,
{
    let (found, i) = match act {
        DeleteType::Key(key) => {
            search::search(cx.cmp, &node.items, key, hint.as_deref_mut(), depth)
        }
        DeleteType::PopMax => (true, node.items.len() - 1),
        DeleteType::PopFront => (node.leaf, 0),
        DeleteType::PopBack => {
            if node.leaf {
                (true, node.items.len() - 1)
            } else {
                (false, node.items.len())
            }
        }
    };

    if node.leaf {
        if found {
            // Removal may drop this leaf below the minimum; the caller
            // handles the rebalancing.
            return Ok(Some(node.items.remove(i)));
        }
        return Ok(None);
    }

    let (deleted, i) = if found {
        if matches!(act, DeleteType::PopMax) {
            // The subtree maximum lives under the last child.
            let i = i + 1;
            let child = cow_pair(cx, node, i)?;
            let Some(prev) = node_delete(cx, child, DeleteType::PopMax, None, depth + 1)? else {
                return Ok(None);
            };
            (prev, i)
        } else {
            // Key found in a branch: replace it with the predecessor
            // popped from the left child.
            let child = cow_pair(cx, node, i)?;
            let Some(pred) = node_delete(cx, child, DeleteType::PopMax, None, depth + 1)? else {
                return Ok(None);
            };
            (mem::replace(&mut node.items[i], pred), i)
        }
    } else {
        let child = cow_pair(cx, node, i)?;
        match node_delete(cx, child, act, hint, depth + 1)? {
            Some(prev) => (prev, i),
            None => return Ok(None),
        }
    };

    if node.children[i].items.len() < cx.min_items {
        rebalance(cx, node, i);
    }
    Ok(Some(deleted))
}

fn rebalance<T, C>(cx: &OpCx<'_, C>, node: &mut Node<T>, mut i: usize) {
    if i == node.items.len() {
        i -= 1;
    }

    let left_len = node.children[i].items.len();
    let right_len = node.children[i + 1].items.len();

    if left_len + right_len < cx.max_items {
        // Merge (left, separator, right) into the left node and drop the
        // right node and its pointer.
        let separator = node.items.remove(i);
        let mut right_link = node.children.remove(i + 1);
        let right = unshared(&mut right_link);
        let left = unshared(&mut node.children[i]);
        left.items.push(separator);
        left.items.append(&mut right.items);
        left.children.append(&mut right.children);
    } else if left_len > right_len {
        // Rotate one slot left to right: the separator drops into the
        // right node and the left node's last item replaces it.
        let (head, tail) = node.children.split_at_mut(i + 1);
        let left = unshared(&mut head[i]);
        let right = unshared(&mut tail[0]);
        let last = left.items.len() - 1;
        let separator = mem::replace(&mut node.items[i], left.items.remove(last));
        right.items.insert(0, separator);
        if !left.leaf {
            let stolen = left.children.remove(left.children.len() - 1);
            right.children.insert(0, stolen);
        }
    } else {
        // Rotate one slot right to left.
        let (head, tail) = node.children.split_at_mut(i + 1);
        let left = unshared(&mut head[i]);
        let right = unshared(&mut tail[0]);
        let separator = mem::replace(&mut node.items[i], right.items.remove(0));
        left.items.push(separator);
        if !left.leaf {
            left.children.push(right.children.remove(0));
        }
    }
}

impl<T, C: Comparator<T>> Clone for BTree<T, C> {
    /// Constant-time snapshot. The clone shares every node with the
    /// original; either side copies nodes privately as it writes.
    fn clone(&self) -> Self {
        Self {
            cmp: self.cmp.clone(),
            gate: Arc::clone(&self.gate),
            root: self.root.clone(),
            count: self.count,
            height: self.height,
            max_items: self.max_items,
            min_items: self.min_items,
            oom: self.oom,
        }
    }
}

impl<T, C> fmt::Debug for BTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTree")
            .field("count", &self.count)
            .field("height", &self.height)
            .field("max_items", &self.max_items)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> BTree<i32> {
        BTreeBuilder::new().degree(3).build()
    }

    fn walk(tree: &BTree<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        tree.ascend(None, |&item| {
            out.push(item);
            true
        });
        out
    }

    #[test]
    fn empty_tree_reports_nothing() {
        let tree: BTree<i32> = BTree::new();
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.get(&7), None);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn set_and_get_single_item() {
        let mut tree = small_tree();
        assert_eq!(tree.set(42), None);
        assert_eq!(tree.get(&42), Some(&42));
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.height(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn set_grows_and_stays_ordered() {
        let mut tree = small_tree();
        for i in (0..200).rev() {
            assert_eq!(tree.set(i), None);
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.count(), 200);
        assert_eq!(walk(&tree), (0..200).collect::<Vec<_>>());
        assert_eq!(tree.min(), Some(&0));
        assert_eq!(tree.max(), Some(&199));
        assert!(tree.height() > 1);
    }

    #[test]
    fn set_duplicate_returns_previous() {
        let mut tree = small_tree();
        for i in 0..50 {
            tree.set(i);
        }
        assert_eq!(tree.set(25), Some(25));
        assert_eq!(tree.count(), 50);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn delete_returns_the_item() {
        let mut tree = small_tree();
        for i in 0..100 {
            tree.set(i);
        }
        for i in (0..100).step_by(2) {
            assert_eq!(tree.delete(&i), Some(i), "deleting {i}");
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.count(), 50);
        for i in 0..100 {
            assert_eq!(tree.get(&i).is_some(), i % 2 == 1);
        }
    }

    #[test]
    fn delete_missing_key_is_a_noop() {
        let mut tree = small_tree();
        for i in 0..20 {
            tree.set(i * 2);
        }
        assert_eq!(tree.delete(&7), None);
        assert_eq!(tree.count(), 20);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn delete_everything_collapses_the_tree() {
        let mut tree = small_tree();
        for i in 0..300 {
            tree.set(i);
        }
        for i in 0..300 {
            assert_eq!(tree.delete(&i), Some(i));
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.get(&0).is_none());
    }

    #[test]
    fn pop_min_drains_in_order() {
        let mut tree = small_tree();
        for i in (0..120).rev() {
            tree.set(i);
        }
        for i in 0..120 {
            assert_eq!(tree.pop_min(), Some(i));
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.pop_min(), None);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn pop_max_drains_in_reverse() {
        let mut tree = small_tree();
        for i in 0..120 {
            tree.set(i);
        }
        for i in (0..120).rev() {
            assert_eq!(tree.pop_max(), Some(i));
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.pop_max(), None);
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let mut tree: BTree<i32> = BTree::new();
        assert_eq!(tree.pop_min(), None);
        assert_eq!(tree.pop_max(), None);
        assert!(!tree.oom());
    }

    #[test]
    fn load_ascending_matches_set() {
        let mut loaded = small_tree();
        let mut set = small_tree();
        for i in 0..2000 {
            assert_eq!(loaded.load(i), None);
            set.set(i);
        }
        loaded.check_invariants().unwrap();
        assert_eq!(loaded.count(), set.count());
        assert_eq!(walk(&loaded), walk(&set));
    }

    #[test]
    fn load_out_of_order_still_correct() {
        let mut tree = small_tree();
        for i in 0..500 {
            tree.load(i);
        }
        for i in (500..1000).rev() {
            tree.load(i);
        }
        tree.load(250);
        tree.check_invariants().unwrap();
        assert_eq!(tree.count(), 1000);
        assert_eq!(walk(&tree), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn load_replaces_duplicates() {
        let mut tree = small_tree();
        for i in 0..50 {
            tree.load(i);
        }
        assert_eq!(tree.load(49), Some(49));
        assert_eq!(tree.load(10), Some(10));
        assert_eq!(tree.count(), 50);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn clear_resets_everything() {
        let mut tree = small_tree();
        for i in 0..100 {
            tree.set(i);
        }
        tree.clear();
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.get(&5), None);
        tree.set(5);
        assert_eq!(tree.count(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn degree_is_clamped() {
        let tiny: BTree<i32> = BTreeBuilder::new().degree(0).build();
        assert_eq!(tiny.max_items, 3);
        let huge: BTree<i32> = BTreeBuilder::new().degree(usize::MAX).build();
        assert_eq!(huge.max_items, 2045);
        assert_eq!(huge.min_items, 1022);
    }

    #[test]
    fn custom_comparator_orders_the_tree() {
        let mut tree = BTreeBuilder::new()
            .degree(3)
            .comparator(|a: &i32, b: &i32| b.cmp(a))
            .build();
        for i in 0..50 {
            tree.set(i);
        }
        let mut out = Vec::new();
        tree.ascend(None, |&item| {
            out.push(item);
            true
        });
        let expected: Vec<i32> = (0..50).rev().collect();
        assert_eq!(out, expected);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn replaced_value_is_observable_with_a_keyed_comparator() {
        #[derive(Clone, Debug, PartialEq)]
        struct Pair {
            key: i32,
            val: i32,
        }
        let by_key = |a: &Pair, b: &Pair| a.key.cmp(&b.key);
        let mut tree = BTreeBuilder::new().degree(4).comparator(by_key).build();
        for key in 0..30 {
            tree.set(Pair { key, val: key });
        }
        let prev = tree.set(Pair { key: 11, val: 999 });
        assert_eq!(prev, Some(Pair { key: 11, val: 11 }));
        assert_eq!(tree.get(&Pair { key: 11, val: 0 }).map(|p| p.val), Some(999));
        assert_eq!(tree.count(), 30);
    }
}

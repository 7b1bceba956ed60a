//! # Ordered Traversal
//!
//! Read-only walks visit items in comparator order and hand each one to a
//! callback; the callback returns `false` to stop early, and the public
//! call reports whether the walk ran to completion.
//!
//! - `ascend(None)` walks everything in order; `ascend(Some(pivot))`
//!   starts at the first item greater than or equal to the pivot.
//! - `descend(None)` walks everything in reverse; `descend(Some(pivot))`
//!   starts at the first item less than or equal to the pivot.
//!
//! ## Action Iteration
//!
//! The action variants walk the same orders but let the callback edit the
//! tree as it goes. The callback receives a private copy of each item and
//! answers with an [`Action`]:
//!
//! - `Keep` leaves the item alone.
//! - `Update` writes the edited copy back, provided the comparator agrees
//!   the key did not change. An edit that moved the key is discarded and
//!   the same position is retried; a well-behaved callback converges, and
//!   the walk neither guesses at intent nor panics for one that does not.
//! - `Delete` removes the item. A leaf holding more than `min_items`
//!   items absorbs the removal in place. Any other position falls back to
//!   a full delete through the root, which may rebalance ancestors the
//!   walk is standing on, so the walk restarts from the deleted key.
//!   Every restart removes one item, which bounds the restarts by the
//!   item count.
//! - `Stop` ends the walk.
//!
//! Action walks mutate, so they copy-on-write every node they visit. An
//! allocation refusal ends the walk with the sticky `oom` flag set;
//! edits already applied remain.

use std::sync::Arc;

use crate::btree::node::{cow_mut, NoMem, Node, OpCx};
use crate::btree::search::{self, PathHint};
use crate::btree::tree::BTree;
use crate::compare::Comparator;

/// Verdict returned by an action-iteration callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Make no change and continue.
    Keep,
    /// Write the edited copy back and continue.
    Update,
    /// Remove the item and continue.
    Delete,
    /// End the walk.
    Stop,
}

enum Walk<T> {
    Done,
    Stopped,
    Restart(T),
}

enum Visit<T> {
    Advance,
    Removed,
    Stopped,
    Restart(T),
}

impl<T, C: Comparator<T>> BTree<T, C> {
    /// In-order walk from `pivot` (or the start). Returns `false` if the
    /// callback stopped the walk.
    pub fn ascend<F>(&self, pivot: Option<&T>, mut f: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.ascend_apply(pivot, None, &mut f)
    }

    pub fn ascend_hint<F>(&self, pivot: Option<&T>, hint: &mut PathHint, mut f: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.ascend_apply(pivot, Some(hint), &mut f)
    }

    fn ascend_apply<F>(&self, pivot: Option<&T>, hint: Option<&mut PathHint>, f: &mut F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let Some(root) = self.root.as_deref() else {
            return true;
        };
        match pivot {
            Some(pivot) => node_ascend(&self.cmp, root, pivot, f, hint, 0),
            None => node_scan(root, f),
        }
    }

    /// Reverse-order walk from `pivot` (or the end). Returns `false` if
    /// the callback stopped the walk.
    pub fn descend<F>(&self, pivot: Option<&T>, mut f: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.descend_apply(pivot, None, &mut f)
    }

    pub fn descend_hint<F>(&self, pivot: Option<&T>, hint: &mut PathHint, mut f: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.descend_apply(pivot, Some(hint), &mut f)
    }

    fn descend_apply<F>(&self, pivot: Option<&T>, hint: Option<&mut PathHint>, f: &mut F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let Some(root) = self.root.as_deref() else {
            return true;
        };
        match pivot {
            Some(pivot) => node_descend(&self.cmp, root, pivot, f, hint, 0),
            None => node_reverse(root, f),
        }
    }
}

impl<T, C> BTree<T, C>
where
    T: Clone,
    C: Comparator<T>,
{
    /// In-order walk whose callback may update or delete items as it
    /// goes.
    pub fn action_ascend<F>(&mut self, pivot: Option<&T>, mut f: F)
    where
        F: FnMut(&mut T) -> Action,
    {
        self.action_apply(pivot, None, &mut f, true);
    }

    pub fn action_ascend_hint<F>(&mut self, pivot: Option<&T>, hint: &mut PathHint, mut f: F)
    where
        F: FnMut(&mut T) -> Action,
    {
        self.action_apply(pivot, Some(hint), &mut f, true);
    }

    /// Reverse-order walk whose callback may update or delete items as
    /// it goes.
    pub fn action_descend<F>(&mut self, pivot: Option<&T>, mut f: F)
    where
        F: FnMut(&mut T) -> Action,
    {
        self.action_apply(pivot, None, &mut f, false);
    }

    pub fn action_descend_hint<F>(&mut self, pivot: Option<&T>, hint: &mut PathHint, mut f: F)
    where
        F: FnMut(&mut T) -> Action,
    {
        self.action_apply(pivot, Some(hint), &mut f, false);
    }

    fn action_apply<F>(
        &mut self,
        pivot: Option<&T>,
        mut hint: Option<&mut PathHint>,
        f: &mut F,
        forward: bool,
    ) -> bool
    where
        F: FnMut(&mut T) -> Action,
    {
        self.oom = false;
        let mut restart: Option<T> = None;
        loop {
            let outcome = {
                let (cx, root, count, _height) = self.parts();
                let Some(root_link) = root.as_mut() else {
                    return true;
                };
                match (restart.as_ref().or(pivot), forward) {
                    (Some(p), true) => {
                        node_action_ascend(&cx, root_link, p, f, count, hint.as_deref_mut(), 0)
                    }
                    (Some(p), false) => {
                        node_action_descend(&cx, root_link, p, f, count, hint.as_deref_mut(), 0)
                    }
                    (None, true) => node_action_scan(&cx, root_link, f, count),
                    (None, false) => node_action_rscan(&cx, root_link, f, count),
                }
            };
            match outcome {
                Err(NoMem) => {
                    self.oom = true;
                    return false;
                }
                Ok(Walk::Done) => return true,
                Ok(Walk::Stopped) => return true,
                Ok(Walk::Restart(key)) => {
                    // The position sits in a node the delete may
                    // rebalance away, so delete through the root and
                    // pick the walk back up from the removed key.
                    self.delete(&key);
                    if self.oom {
                        return false;
                    }
                    restart = Some(key);
                }
            }
        }
    }
}

fn node_scan<T, F>(node: &Node<T>, f: &mut F) -> bool
where
    F: FnMut(&T) -> bool,
{
    if node.leaf {
        return node.items.iter().all(|item| f(item));
    }
    for i in 0..node.items.len() {
        if !node_scan(node.children[i].as_ref(), f) {
            return false;
        }
        if !f(&node.items[i]) {
            return false;
        }
    }
    node_scan(node.children[node.items.len()].as_ref(), f)
}

fn node_ascend<T, C, F>(
    cmp: &C,
    node: &Node<T>,
    pivot: &T,
    f: &mut F,
    mut hint: Option<&mut PathHint>,
    depth: usize,
) -> bool
where
    C: Comparator<T>,
    F: FnMut(&T) -> bool,
{
    let (found, mut i) = search::search(cmp, &node.items, pivot, hint.as_deref_mut(), depth);
    if !found && !node.leaf {
        if !node_ascend(cmp, node.children[i].as_ref(), pivot, f, hint, depth + 1) {
            return false;
        }
    }
    while i < node.items.len() {
        if !f(&node.items[i]) {
            return false;
        }
        if !node.leaf {
            if !node_scan(node.children[i + 1].as_ref(), f) {
                return false;
            }
        }
        i += 1;
    }
    true
}

fn node_reverse<T, F>(node: &Node<T>, f: &mut F) -> bool
where
    F: FnMut(&T) -> bool,
{
    if node.leaf {
        return node.items.iter().rev().all(|item| f(item));
    }
    if !node_reverse(node.children[node.items.len()].as_ref(), f) {
        return false;
    }
    let mut i = node.items.len() - 1;
    loop {
        if !f(&node.items[i]) {
            return false;
        }
        if !node_reverse(node.children[i].as_ref(), f) {
            return false;
        }
        if i == 0 {
            return true;
        }
        i -= 1;
    }
}

fn node_descend<T, C, F>(
    cmp: &C,
    node: &Node<T>,
    pivot: &T,
    f: &mut F,
    mut hint: Option<&mut PathHint>,
    depth: usize,
) -> bool
where
    C: Comparator<T>,
    F: FnMut(&T) -> bool,
{
    let (found, mut i) = search::search(cmp, &node.items, pivot, hint.as_deref_mut(), depth);
    if !found {
        if !node.leaf {
            if !node_descend(cmp, node.children[i].as_ref(), pivot, f, hint, depth + 1) {
                return false;
            }
        }
        if i == 0 {
            return true;
        }
        i -= 1;
    }
    loop {
        if !f(&node.items[i]) {
            return false;
        }
        if !node.leaf {
            if !node_reverse(node.children[i].as_ref(), f) {
                return false;
            }
        }
        if i == 0 {
            return true;
        }
        i -= 1;
    }
}

/// Runs the callback for the item at `i`, applying its verdict. Retries
/// in place while updates keep drifting the key.
fn visit_item<T, C, F>(
    cx: &OpCx<'_, C>,
    node: &mut Node<T>,
    i: usize,
    f: &mut F,
    count: &mut usize,
) -> Visit<T>
where
    T: Clone,
    C: Comparator<T>,
    F: FnMut(&mut T) -> Action,
{
    loop {
        let mut scratch = node.items[i].clone();
        match f(&mut scratch) {
            Action::Keep => return Visit::Advance,
            Action::Stop => return Visit::Stopped,
            Action::Update => {
                if cx.cmp.compare(&scratch, &node.items[i]).is_eq() {
                    node.items[i] = scratch;
                    return Visit::Advance;
                }
            }
            Action::Delete => {
                if node.leaf && node.items.len() > cx.min_items {
                    node.items.remove(i);
                    *count -= 1;
                    return Visit::Removed;
                }
                return Visit::Restart(node.items[i].clone());
            }
        }
    }
}

fn node_action_scan<T, C, F>(
    cx: &OpCx<'_, C>,
    link: &mut Arc<Node<T>>,
    f: &mut F,
    count: &mut usize,
) -> Result<Walk<T>, NoMem>
where
    T: Clone,
    C: Comparator<T>,
    F: FnMut(&mut T) -> Action,
{
    let node = cow_mut(cx, link)?;
    if node.leaf {
        let mut i = 0;
        while i < node.items.len() {
            match visit_item(cx, node, i, f, count) {
                Visit::Advance => i += 1,
                Visit::Removed => {}
                Visit::Stopped => return Ok(Walk::Stopped),
                Visit::Restart(key) => return Ok(Walk::Restart(key)),
            }
        }
        return Ok(Walk::Done);
    }
    let mut i = 0;
    loop {
        match node_action_scan(cx, &mut node.children[i], f, count)? {
            Walk::Done => {}
            other => return Ok(other),
        }
        if i == node.items.len() {
            return Ok(Walk::Done);
        }
        match visit_item(cx, node, i, f, count) {
            Visit::Advance | Visit::Removed => i += 1,
            Visit::Stopped => return Ok(Walk::Stopped),
            Visit::Restart(key) => return Ok(Walk::Restart(key)),
        }
    }
}

fn node_action_rscan<T, C, F>(
    cx: &OpCx<'_, C>,
    link: &mut Arc<Node<T>>,
    f: &mut F,
    count: &mut usize,
) -> Result<Walk<T>, NoMem>
where
    T: Clone,
    C: Comparator<T>,
    F: FnMut(&mut T) -> Action,
{
    let node = cow_mut(cx, link)?;
    if node.leaf {
        let mut i = node.items.len();
        while i > 0 {
            i -= 1;
            match visit_item(cx, node, i, f, count) {
                Visit::Advance | Visit::Removed => {}
                Visit::Stopped => return Ok(Walk::Stopped),
                Visit::Restart(key) => return Ok(Walk::Restart(key)),
            }
        }
        return Ok(Walk::Done);
    }
    let last = node.children.len() - 1;
    match node_action_rscan(cx, &mut node.children[last], f, count)? {
        Walk::Done => {}
        other => return Ok(other),
    }
    let mut i = node.items.len();
    while i > 0 {
        i -= 1;
        match visit_item(cx, node, i, f, count) {
            Visit::Advance | Visit::Removed => {}
            Visit::Stopped => return Ok(Walk::Stopped),
            Visit::Restart(key) => return Ok(Walk::Restart(key)),
        }
        match node_action_rscan(cx, &mut node.children[i], f, count)? {
            Walk::Done => {}
            other => return Ok(other),
        }
    }
    Ok(Walk::Done)
}

fn node_action_ascend<T, C, F>(
    cx: &OpCx<'_, C>,
    link: &mut Arc<Node<T>>,
    pivot: &T,
    f: &mut F,
    count: &mut usize,
    mut hint: Option<&mut PathHint>,
    depth: usize,
) -> Result<Walk<T>, NoMem>
where
    T: Clone,
    C: Comparator<T>,
    F: FnMut(&mut T) -> Action,
{
    let node = cow_mut(cx, link)?;
    let (found, mut i) = search::search(cx.cmp, &node.items, pivot, hint.as_deref_mut(), depth);
    if !found && !node.leaf {
        match node_action_ascend(cx, &mut node.children[i], pivot, f, count, hint, depth + 1)? {
            Walk::Done => {}
            other => return Ok(other),
        }
    }
    while i < node.items.len() {
        match visit_item(cx, node, i, f, count) {
            Visit::Advance => {
                if !node.leaf {
                    match node_action_scan(cx, &mut node.children[i + 1], f, count)? {
                        Walk::Done => {}
                        other => return Ok(other),
                    }
                }
                i += 1;
            }
            Visit::Removed => {}
            Visit::Stopped => return Ok(Walk::Stopped),
            Visit::Restart(key) => return Ok(Walk::Restart(key)),
        }
    }
    Ok(Walk::Done)
}

fn node_action_descend<T, C, F>(
    cx: &OpCx<'_, C>,
    link: &mut Arc<Node<T>>,
    pivot: &T,
    f: &mut F,
    count: &mut usize,
    mut hint: Option<&mut PathHint>,
    depth: usize,
) -> Result<Walk<T>, NoMem>
where
    T: Clone,
    C: Comparator<T>,
    F: FnMut(&mut T) -> Action,
{
    let node = cow_mut(cx, link)?;
    let (found, mut i) = search::search(cx.cmp, &node.items, pivot, hint.as_deref_mut(), depth);
    if !found {
        if !node.leaf {
            match node_action_descend(cx, &mut node.children[i], pivot, f, count, hint, depth + 1)?
            {
                Walk::Done => {}
                other => return Ok(other),
            }
        }
        if i == 0 {
            return Ok(Walk::Done);
        }
        i -= 1;
    }
    loop {
        match visit_item(cx, node, i, f, count) {
            Visit::Advance => {
                if !node.leaf {
                    match node_action_rscan(cx, &mut node.children[i], f, count)? {
                        Walk::Done => {}
                        other => return Ok(other),
                    }
                }
            }
            Visit::Removed => {}
            Visit::Stopped => return Ok(Walk::Stopped),
            Visit::Restart(key) => return Ok(Walk::Restart(key)),
        }
        if i == 0 {
            return Ok(Walk::Done);
        }
        i -= 1;
    }
}

//! # Structural Verification
//!
//! `check_invariants` audits a whole tree: every leaf sits at the
//! recorded height, every node respects the occupancy bounds (the root
//! is exempt from the minimum), branches carry one more child than
//! items, the in-order walk ascends strictly, and its length matches the
//! recorded count. Tests call it after every interesting mutation; it is
//! public because embedders stress-testing their own comparators want
//! the same audit.

use eyre::{ensure, Result};

use crate::btree::node::Node;
use crate::btree::tree::BTree;
use crate::compare::Comparator;

impl<T, C: Comparator<T>> BTree<T, C> {
    pub fn check_invariants(&self) -> Result<()> {
        let Some(root) = self.root.as_deref() else {
            ensure!(self.count == 0, "empty tree reports count {}", self.count);
            ensure!(self.height == 0, "empty tree reports height {}", self.height);
            return Ok(());
        };
        ensure!(self.height > 0, "rooted tree reports height 0");
        ensure!(!root.items.is_empty(), "rooted tree has an itemless root");
        check_shape(root, 1, self.height)?;
        check_occupancy(root, true, self.min_items, self.max_items)?;
        let mut walked = 0usize;
        let mut last: Option<&T> = None;
        check_order(&self.cmp, root, &mut last, &mut walked)?;
        ensure!(
            walked == self.count,
            "in-order walk visited {} items but count is {}",
            walked,
            self.count
        );
        Ok(())
    }

    /// Number of nodes currently reachable from the root.
    pub fn node_count(&self) -> usize {
        fn nodes<T>(node: &Node<T>) -> usize {
            1 + node.children.iter().map(|c| nodes(c)).sum::<usize>()
        }
        self.root.as_deref().map_or(0, nodes)
    }
}

fn check_shape<T>(node: &Node<T>, depth: usize, height: usize) -> Result<()> {
    if node.leaf {
        ensure!(
            node.children.is_empty(),
            "leaf carries {} children",
            node.children.len()
        );
        ensure!(
            depth == height,
            "leaf at depth {} in a tree of height {}",
            depth,
            height
        );
        return Ok(());
    }
    ensure!(
        node.children.len() == node.items.len() + 1,
        "branch with {} items has {} children",
        node.items.len(),
        node.children.len()
    );
    for child in &node.children {
        check_shape(child, depth + 1, height)?;
    }
    Ok(())
}

fn check_occupancy<T>(node: &Node<T>, is_root: bool, min_items: usize, max_items: usize) -> Result<()> {
    if is_root {
        ensure!(
            !node.items.is_empty() && node.items.len() <= max_items,
            "root holds {} items with capacity {}",
            node.items.len(),
            max_items
        );
    } else {
        ensure!(
            node.items.len() >= min_items && node.items.len() <= max_items,
            "node holds {} items outside [{}, {}]",
            node.items.len(),
            min_items,
            max_items
        );
    }
    for child in &node.children {
        check_occupancy(child, false, min_items, max_items)?;
    }
    Ok(())
}

fn check_order<'t, T, C: Comparator<T>>(
    cmp: &C,
    node: &'t Node<T>,
    last: &mut Option<&'t T>,
    walked: &mut usize,
) -> Result<()> {
    let mut visit = |item: &'t T, last: &mut Option<&'t T>, walked: &mut usize| -> Result<()> {
        if let Some(prev) = *last {
            ensure!(
                cmp.compare(prev, item).is_lt(),
                "in-order walk is not strictly ascending"
            );
        }
        *last = Some(item);
        *walked += 1;
        Ok(())
    };
    if node.leaf {
        for item in &node.items {
            visit(item, last, walked)?;
        }
        return Ok(());
    }
    for i in 0..node.items.len() {
        check_order(cmp, node.children[i].as_ref(), last, walked)?;
        visit(&node.items[i], last, walked)?;
    }
    check_order(cmp, node.children[node.items.len()].as_ref(), last, walked)
}

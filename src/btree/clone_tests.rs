//! Snapshot and copy-on-write behavior, including clones living on
//! other threads and budget accounting across shared structure.

use std::sync::Arc;
use std::thread;

use crate::btree::tree::{BTree, BTreeBuilder};
use crate::memory::{AllocGate, MemoryBudget};

fn filled(n: i32, degree: usize) -> BTree<i32> {
    let mut tree = BTreeBuilder::new().degree(degree).build();
    for i in 0..n {
        tree.set(i);
    }
    tree
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
fn clone_matches_the_original() {
    let tree = filled(1000, 3);
    let snapshot = tree.clone();
    assert_eq!(snapshot.count(), tree.count());
    assert_eq!(snapshot.height(), tree.height());
    assert_eq!(walk(&snapshot), walk(&tree));
    snapshot.check_invariants().unwrap();
}

#[test]
fn mutating_the_original_leaves_the_clone_alone() {
    let mut tree = filled(500, 3);
    let snapshot = tree.clone();
    for i in 0..500 {
        tree.delete(&i);
        tree.set(i + 10_000);
    }
    assert_eq!(snapshot.count(), 500);
    assert_eq!(walk(&snapshot), (0..500).collect::<Vec<_>>());
    assert_eq!(tree.count(), 500);
    assert_eq!(tree.min(), Some(&10_000));
    tree.check_invariants().unwrap();
    snapshot.check_invariants().unwrap();
}

#[test]
fn mutating_the_clone_leaves_the_original_alone() {
    let tree = filled(500, 3);
    let mut snapshot = tree.clone();
    for i in (0..500).step_by(2) {
        snapshot.delete(&i);
    }
    assert_eq!(tree.count(), 500);
    assert_eq!(snapshot.count(), 250);
    assert_eq!(walk(&tree), (0..500).collect::<Vec<_>>());
    tree.check_invariants().unwrap();
    snapshot.check_invariants().unwrap();
}

#[test]
fn chained_clones_stay_independent() {
    let mut a = filled(200, 4);
    let mut b = a.clone();
    let mut c = b.clone();
    a.set(1000);
    b.delete(&0);
    c.clear();
    assert_eq!(a.count(), 201);
    assert_eq!(b.count(), 199);
    assert_eq!(c.count(), 0);
    a.check_invariants().unwrap();
    b.check_invariants().unwrap();
    c.check_invariants().unwrap();
}

#[test]
fn clone_survives_dropping_the_original() {
    let snapshot = {
        let tree = filled(300, 3);
        tree.clone()
    };
    assert_eq!(snapshot.count(), 300);
    assert_eq!(walk(&snapshot), (0..300).collect::<Vec<_>>());
    snapshot.check_invariants().unwrap();
}

#[test]
fn clearing_the_original_keeps_the_clone() {
    let mut tree = filled(300, 3);
    let snapshot = tree.clone();
    tree.clear();
    assert_eq!(tree.count(), 0);
    assert_eq!(snapshot.count(), 300);
    snapshot.check_invariants().unwrap();
}

#[test]
fn writes_after_clone_copy_only_their_path() {
    let budget = Arc::new(MemoryBudget::with_limit(usize::MAX));
    let gate: Arc<dyn AllocGate> = budget.clone();
    let mut tree: BTree<i32> = BTreeBuilder::new().degree(16).budget(gate).build();
    for i in 0..5000 {
        tree.set(i);
    }
    let shared = budget.used();
    let _snapshot = tree.clone();
    assert_eq!(budget.used(), shared);

    tree.set(2500);
    let after_write = budget.used();
    assert!(after_write > shared);
    // One write duplicates a root-to-leaf path, not the whole tree.
    assert!(after_write - shared < shared / 4);
}

#[test]
fn budget_drains_when_every_tree_drops() {
    let budget = Arc::new(MemoryBudget::with_limit(usize::MAX));
    let gate: Arc<dyn AllocGate> = budget.clone();
    {
        let mut tree: BTree<i32> = BTreeBuilder::new().degree(3).budget(gate).build();
        for i in 0..1000 {
            tree.set(i);
        }
        assert!(budget.used() > 0);
        let mut snapshot = tree.clone();
        for i in 0..1000 {
            snapshot.delete(&i);
        }
    }
    assert_eq!(budget.used(), 0);
}

#[test]
fn clones_mutate_on_separate_threads() {
    let tree = filled(2000, 8);
    let mut workers = Vec::new();
    for lane in 0..4i32 {
        let mut snapshot = tree.clone();
        workers.push(thread::spawn(move || {
            for i in 0..2000 {
                if i % 4 == lane {
                    snapshot.delete(&i);
                }
            }
            snapshot.set(10_000 + lane);
            snapshot.check_invariants().unwrap();
            (lane, snapshot.count())
        }));
    }
    for worker in workers {
        let (lane, count) = worker.join().unwrap();
        assert_eq!(count, 2000 - 500 + 1, "lane {lane}");
    }
    assert_eq!(tree.count(), 2000);
    assert_eq!(walk(&tree), (0..2000).collect::<Vec<_>>());
    tree.check_invariants().unwrap();
}

#[test]
fn snapshots_are_send_and_sync() {
    fn assert_send_sync<X: Send + Sync>() {}
    assert_send_sync::<BTree<i32>>();
    assert_send_sync::<crate::memory::MemoryBudget>();
}

//! Fuzz testing for tree operations.
//!
//! This fuzz target drives an arbitrary operation sequence through a
//! tree and a `std::collections::BTreeSet` side by side, checking that
//! every answer matches and that the structural invariants hold. A
//! snapshot taken mid-sequence must still equal its capture at the end.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bough::{BTree, BTreeBuilder, PathHint};
use std::collections::BTreeSet;

#[derive(Debug, Arbitrary)]
struct TreeInput {
    degree: u8,
    operations: Vec<TreeOperation>,
}

#[derive(Debug, Arbitrary)]
enum TreeOperation {
    Set(i16),
    SetHint(i16),
    Delete(i16),
    DeleteHint(i16),
    Load(i16),
    Get(i16),
    PopMin,
    PopMax,
    Snapshot,
    Clear,
}

fuzz_target!(|input: TreeInput| {
    if input.operations.len() > 512 {
        return;
    }

    let mut tree: BTree<i16> = BTreeBuilder::new().degree(input.degree as usize).build();
    let mut model: BTreeSet<i16> = BTreeSet::new();
    let mut hint = PathHint::new();
    let mut snapshot: Option<(BTree<i16>, Vec<i16>)> = None;

    for op in &input.operations {
        match op {
            TreeOperation::Set(key) => {
                assert_eq!(tree.set(*key).is_some(), !model.insert(*key));
            }
            TreeOperation::SetHint(key) => {
                assert_eq!(tree.set_hint(*key, &mut hint).is_some(), !model.insert(*key));
            }
            TreeOperation::Delete(key) => {
                assert_eq!(tree.delete(key), model.take(key));
            }
            TreeOperation::DeleteHint(key) => {
                assert_eq!(tree.delete_hint(key, &mut hint), model.take(key));
            }
            TreeOperation::Load(key) => {
                assert_eq!(tree.load(*key).is_some(), !model.insert(*key));
            }
            TreeOperation::Get(key) => {
                assert_eq!(tree.get(key), model.get(key));
            }
            TreeOperation::PopMin => {
                assert_eq!(tree.pop_min(), model.pop_first());
            }
            TreeOperation::PopMax => {
                assert_eq!(tree.pop_max(), model.pop_last());
            }
            TreeOperation::Snapshot => {
                let contents: Vec<i16> = model.iter().copied().collect();
                snapshot = Some((tree.clone(), contents));
            }
            TreeOperation::Clear => {
                tree.clear();
                model.clear();
            }
        }
        assert_eq!(tree.count(), model.len());
    }

    tree.check_invariants().unwrap();
    let mut walked: Vec<i16> = Vec::with_capacity(model.len());
    tree.ascend(None, |&item| {
        walked.push(item);
        true
    });
    assert_eq!(walked, model.iter().copied().collect::<Vec<_>>());

    if let Some((frozen, contents)) = snapshot {
        frozen.check_invariants().unwrap();
        let mut walked: Vec<i16> = Vec::with_capacity(contents.len());
        frozen.ascend(None, |&item| {
            walked.push(item);
            true
        });
        assert_eq!(walked, contents);
    }
});

//! # Item Ordering
//!
//! Every tree is parameterized by a [`Comparator`]: a three-way total order
//! over the item type. The comparator defines key equivalence, so items
//! that compare equal occupy the same slot and setting one replaces the
//! other.
//!
//! ## Contract
//!
//! `compare` must be a total order: antisymmetric, transitive, and stable
//! for the lifetime of the tree. Comparing the same pair must always yield
//! the same answer; a comparator that changes its mind corrupts the tree's
//! ordering invariant.
//!
//! ## Forms
//!
//! - [`NaturalOrder`] uses `Ord` and is the default type parameter, so
//!   `BTree<i64>` just works.
//! - Any `Fn(&T, &T) -> Ordering + Clone` closure is a comparator. State
//!   the comparator needs (a collation table, a field selector) is closed
//!   over rather than passed through a side channel.
//!
//! Comparators are monomorphized into the tree, so a closure comparator
//! costs the same as a hand-written one.

use std::cmp::Ordering;

/// Three-way total order over `T`.
pub trait Comparator<T>: Clone {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders items by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering + Clone,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_follows_ord() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(NaturalOrder.compare(&2, &2), Ordering::Equal);
        assert_eq!(NaturalOrder.compare(&3, &2), Ordering::Greater);
    }

    #[test]
    fn closure_comparator_reverses() {
        let rev = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(rev.compare(&1, &2), Ordering::Greater);
        assert_eq!(rev.compare(&2, &1), Ordering::Less);
    }

    #[test]
    fn closure_comparator_projects_a_key() {
        let by_key = |a: &(i32, &str), b: &(i32, &str)| a.0.cmp(&b.0);
        assert_eq!(by_key.compare(&(1, "x"), &(1, "y")), Ordering::Equal);
    }
}

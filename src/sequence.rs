// ABOUTME: Ordered-sequence kernel maintaining 1-based contiguous positions over any sibling scope
// ABOUTME: Generic insert/remove/move/renumber shared by the routine tree and the workout timeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Robur Training

//! Positional maintenance for ordered sibling scopes.
//!
//! A scope is any vector of [`Positioned`] items: a routine's top-level
//! sections, one section's children, or a workout's element timeline. After
//! every operation here, positions are exactly `1..=N` in iteration order.
//!
//! Index arguments are programming contracts, not client input: callers
//! translate and range-check client-supplied paths and positions *before*
//! reaching this module, so an out-of-range index is a caller bug and panics.

/// An item that carries its 1-based position within its sibling scope.
pub trait Positioned {
    /// Current 1-based position.
    fn position(&self) -> u32;

    /// Overwrite the stored position.
    fn set_position(&mut self, position: u32);
}

/// Insert `item` at 0-based `index`, shifting later siblings up by one.
/// The new item ends up at position `index + 1`.
///
/// # Panics
///
/// Panics if `index > scope.len()`.
pub fn insert<T: Positioned>(scope: &mut Vec<T>, index: usize, item: T) {
    assert!(
        index <= scope.len(),
        "insert index {index} out of range for scope of length {}",
        scope.len()
    );
    scope.insert(index, item);
    renumber(scope);
}

/// Remove and return the item at 0-based `index`, shifting later siblings
/// down by one.
///
/// # Panics
///
/// Panics if `index >= scope.len()`.
pub fn remove<T: Positioned>(scope: &mut Vec<T>, index: usize) -> T {
    assert!(
        index < scope.len(),
        "remove index {index} out of range for scope of length {}",
        scope.len()
    );
    let item = scope.remove(index);
    renumber(scope);
    item
}

/// Move the item at `from` to `to`, where `to` is interpreted in the
/// post-removal index space: the result equals `remove(from)` followed by
/// `insert(to)`. Moving an item onto its own index is a no-op.
///
/// # Panics
///
/// Panics if `from` or `to` is outside `0..scope.len()`.
pub fn move_item<T: Positioned>(scope: &mut Vec<T>, from: usize, to: usize) {
    assert!(
        from < scope.len(),
        "move source {from} out of range for scope of length {}",
        scope.len()
    );
    assert!(
        to < scope.len(),
        "move target {to} out of range for scope of length {}",
        scope.len()
    );
    if from == to {
        return;
    }
    let item = scope.remove(from);
    scope.insert(to, item);
    renumber(scope);
}

/// Reassign positions `1..=N` in current iteration order. Idempotent; called
/// by every mutating operation above and safe to call again at any time.
pub fn renumber<T: Positioned>(scope: &mut [T]) {
    for (index, item) in scope.iter_mut().enumerate() {
        item.set_position(index as u32 + 1);
    }
}

/// Whether positions are exactly `1..=N` in iteration order.
#[must_use]
pub fn is_contiguous<T: Positioned>(scope: &[T]) -> bool {
    scope
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() == index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Slot {
        position: u32,
        label: &'static str,
    }

    impl Slot {
        fn new(label: &'static str) -> Self {
            Self { position: 0, label }
        }
    }

    impl Positioned for Slot {
        fn position(&self) -> u32 {
            self.position
        }

        fn set_position(&mut self, position: u32) {
            self.position = position;
        }
    }

    fn labels(scope: &[Slot]) -> Vec<&'static str> {
        scope.iter().map(|s| s.label).collect()
    }

    #[test]
    fn test_insert_assigns_contiguous_positions() {
        let mut scope = Vec::new();
        insert(&mut scope, 0, Slot::new("b"));
        insert(&mut scope, 0, Slot::new("a"));
        insert(&mut scope, 2, Slot::new("c"));

        assert_eq!(labels(&scope), vec!["a", "b", "c"]);
        assert_eq!(
            scope.iter().map(Slot::position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(is_contiguous(&scope));
    }

    #[test]
    fn test_insert_middle_shifts_later_siblings() {
        let mut scope = Vec::new();
        insert(&mut scope, 0, Slot::new("a"));
        insert(&mut scope, 1, Slot::new("c"));
        insert(&mut scope, 1, Slot::new("b"));

        assert_eq!(labels(&scope), vec!["a", "b", "c"]);
        assert_eq!(scope[2].position, 3);
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut scope = Vec::new();
        for label in ["a", "b", "c", "d"] {
            let end = scope.len();
            insert(&mut scope, end, Slot::new(label));
        }

        let removed = remove(&mut scope, 1);
        assert_eq!(removed.label, "b");
        assert_eq!(labels(&scope), vec!["a", "c", "d"]);
        assert!(is_contiguous(&scope));
    }

    #[test]
    fn test_move_up_swaps_with_previous() {
        let mut scope = Vec::new();
        for label in ["a", "b", "c"] {
            let end = scope.len();
            insert(&mut scope, end, Slot::new(label));
        }

        move_item(&mut scope, 2, 1);
        assert_eq!(labels(&scope), vec!["a", "c", "b"]);
        assert!(is_contiguous(&scope));
    }

    #[test]
    fn test_move_same_index_is_noop() {
        let mut scope = Vec::new();
        for label in ["a", "b", "c"] {
            let end = scope.len();
            insert(&mut scope, end, Slot::new(label));
        }

        move_item(&mut scope, 1, 1);
        assert_eq!(labels(&scope), vec!["a", "b", "c"]);
        assert!(is_contiguous(&scope));
    }

    #[test]
    fn test_move_to_front_and_back() {
        let mut scope = Vec::new();
        for label in ["a", "b", "c", "d"] {
            let end = scope.len();
            insert(&mut scope, end, Slot::new(label));
        }

        move_item(&mut scope, 3, 0);
        assert_eq!(labels(&scope), vec!["d", "a", "b", "c"]);

        move_item(&mut scope, 0, 3);
        assert_eq!(labels(&scope), vec!["a", "b", "c", "d"]);
        assert!(is_contiguous(&scope));
    }

    #[test]
    fn test_renumber_is_idempotent() {
        let mut scope = vec![Slot::new("a"), Slot::new("b")];
        renumber(&mut scope);
        let first: Vec<u32> = scope.iter().map(Slot::position).collect();
        renumber(&mut scope);
        let second: Vec<u32> = scope.iter().map(Slot::position).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "insert index 2 out of range")]
    fn test_insert_beyond_length_panics() {
        let mut scope = vec![Slot::new("a")];
        renumber(&mut scope);
        insert(&mut scope, 2, Slot::new("b"));
    }

    #[test]
    #[should_panic(expected = "remove index 0 out of range")]
    fn test_remove_from_empty_panics() {
        let mut scope: Vec<Slot> = Vec::new();
        remove(&mut scope, 0);
    }

    #[test]
    fn test_empty_scope_is_contiguous() {
        let scope: Vec<Slot> = Vec::new();
        assert!(is_contiguous(&scope));
    }
}

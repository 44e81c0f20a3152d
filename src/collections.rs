//! Non-destructive slice helpers: dedup, sort, and group-by.
//!
//! All helpers return new collections and leave the input untouched.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Sort direction for [`sorted_by_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Deduplicate, preserving the first occurrence of each value.
///
/// # Examples
/// ```
/// use satchel::collections::unique;
/// assert_eq!(unique(&[1, 2, 2, 3, 1]), vec![1, 2, 3]);
/// ```
pub fn unique<T>(items: &[T]) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((*item).clone()))
        .cloned()
        .collect()
}

/// Deduplicate by a derived key, preserving the first occurrence per key.
pub fn unique_by_key<T, K, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(key(item)))
        .cloned()
        .collect()
}

/// Return a sorted copy, ordered by a derived key.
pub fn sorted_by_key<T, K, F>(items: &[T], key: F, order: Order) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = key(a).cmp(&key(b));
        match order {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// Group items by a derived key.
pub fn group_by<T, K, F>(items: &[T], key: F) -> HashMap<K, Vec<T>>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item.clone());
    }
    groups
}

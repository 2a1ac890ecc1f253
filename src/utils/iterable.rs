//! Lazy, restartable sequences with first-occurrence grouping.
//!
//! [`Enumerable`] wraps any iterator that can be cloned. Adapters ([`map`],
//! [`filter`], [`collect`]) build a new lazy sequence without touching the
//! source; terminal operations ([`first`], [`group_by`], [`to_vec`]) clone the
//! wrapped iterator before driving it, so calling them repeatedly re-derives
//! the result from the original finite source instead of exhausting it.
//!
//! # Examples
//!
//! ```rust
//! use duffle_explorer::utils::iterable::iter;
//!
//! let names = ["ns/a", "b", "ns/c"];
//! let groups = iter(names)
//!     .group_by(|name| name.split_once('/').map(|(prefix, _)| prefix))
//!     .to_vec();
//!
//! assert_eq!(groups[0].key, Some("ns"));
//! assert_eq!(groups[0].values, vec!["ns/a", "ns/c"]);
//! assert_eq!(groups[1].key, None);
//! ```
//!
//! [`map`]: Enumerable::map
//! [`filter`]: Enumerable::filter
//! [`collect`]: Enumerable::collect
//! [`first`]: Enumerable::first
//! [`group_by`]: Enumerable::group_by
//! [`to_vec`]: Enumerable::to_vec

use std::collections::HashMap;
use std::hash::Hash;
use std::iter::{Filter, FlatMap, Map};

/// A key and every source element that produced it, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<K, T> {
    /// The value returned by the grouping selector
    pub key: K,
    /// Members sharing `key`, in the order they appeared in the source
    pub values: Vec<T>,
}

/// Wrap a finite source in a lazy [`Enumerable`].
///
/// The source's iterator must be `Clone`; slices, vectors, arrays and the
/// adapters produced by this module all qualify.
pub fn iter<S>(source: S) -> Enumerable<S::IntoIter>
where
    S: IntoIterator,
    S::IntoIter: Clone,
{
    Enumerable {
        source: source.into_iter(),
    }
}

/// A composable lazy sequence over a restartable iterator.
#[derive(Debug, Clone)]
pub struct Enumerable<I> {
    source: I,
}

impl<I> Enumerable<I>
where
    I: Iterator + Clone,
{
    /// Return the first element matching `predicate`, or `None`.
    ///
    /// Evaluation stops at the matching element; nothing after it is
    /// produced.
    pub fn first<P>(&self, mut predicate: P) -> Option<I::Item>
    where
        P: FnMut(&I::Item) -> bool,
    {
        self.source.clone().find(|item| predicate(item))
    }

    /// Transform every element. Lazy; order is preserved.
    pub fn map<U, F>(self, f: F) -> Enumerable<Map<I, F>>
    where
        F: FnMut(I::Item) -> U + Clone,
    {
        Enumerable {
            source: self.source.map(f),
        }
    }

    /// Keep elements matching `predicate`. Lazy; order is preserved.
    ///
    /// The predicate runs once per source element each time the filtered
    /// sequence is driven, and never before.
    pub fn filter<P>(self, predicate: P) -> Enumerable<Filter<I, P>>
    where
        P: FnMut(&I::Item) -> bool + Clone,
    {
        Enumerable {
            source: self.source.filter(predicate),
        }
    }

    /// Flat-map: yield every element of `f(item)` before moving on to the
    /// next source element.
    pub fn collect<U, F>(self, f: F) -> Enumerable<FlatMap<I, U, F>>
    where
        U: IntoIterator,
        U::IntoIter: Clone,
        F: FnMut(I::Item) -> U + Clone,
    {
        Enumerable {
            source: self.source.flat_map(f),
        }
    }

    /// Partition the sequence by `selector`.
    ///
    /// The whole source is consumed to discover every group. Groups come
    /// out in the order their key was first seen; members keep source
    /// order. Keys are indexed, so the cost is linear in the source length.
    pub fn group_by<K, F>(&self, mut selector: F) -> Enumerable<std::vec::IntoIter<Group<K, I::Item>>>
    where
        K: Eq + Hash + Clone,
        F: FnMut(&I::Item) -> K,
        I::Item: Clone,
    {
        let mut groups: Vec<Group<K, I::Item>> = Vec::new();
        let mut slots: HashMap<K, usize> = HashMap::new();

        for item in self.source.clone() {
            let key = selector(&item);
            if let Some(&slot) = slots.get(&key) {
                groups[slot].values.push(item);
            } else {
                slots.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    values: vec![item],
                });
            }
        }

        iter(groups)
    }

    /// Materialise the sequence. Safe to call any number of times.
    pub fn to_vec(&self) -> Vec<I::Item> {
        self.source.clone().collect()
    }
}

impl<I> IntoIterator for Enumerable<I>
where
    I: Iterator,
{
    type Item = I::Item;
    type IntoIter = I;

    fn into_iter(self) -> I {
        self.source
    }
}

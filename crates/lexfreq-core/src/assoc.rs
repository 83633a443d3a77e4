//! Ordered key-value helpers used to reshape retrieval results.
//!
//! Everything here is pure and total: missing data is carried as
//! [`Observed::Unavailable`] rather than an error or a silent zero.

use std::collections::BTreeMap;

use lexfreq_types::Observed;

/// Arbitrarily nested key-value structure.
#[derive(Clone, Debug, PartialEq)]
pub enum Nested<K, V> {
    Leaf(V),
    Branch(BTreeMap<K, Nested<K, V>>),
}

/// Output of [`deep_flatten`]: a scalar passes through, a branch becomes a
/// map keyed by the path to each leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Flat<K, V> {
    Scalar(V),
    Map(BTreeMap<K, V>),
}

impl<K: Ord, V> Flat<K, V> {
    /// The flattened map; a pass-through scalar yields an empty map.
    pub fn into_map(self) -> BTreeMap<K, V> {
        match self {
            Flat::Map(map) => map,
            Flat::Scalar(_) => BTreeMap::new(),
        }
    }
}

/// Flatten `nested` into `path -> leaf`, paths ordered outermost key first.
pub fn deep_flatten<K: Ord + Clone, V>(nested: Nested<K, V>) -> Flat<Vec<K>, V> {
    deep_flatten_with(nested, |path| path)
}

/// Like [`deep_flatten`], passing each path through `key_fn`.
///
/// Paths that `key_fn` maps to the same key collapse; the later path in key
/// order wins.
pub fn deep_flatten_with<K, V, K2, F>(nested: Nested<K, V>, key_fn: F) -> Flat<K2, V>
where
    K: Ord + Clone,
    K2: Ord,
    F: Fn(Vec<K>) -> K2,
{
    match nested {
        Nested::Leaf(value) => Flat::Scalar(value),
        Nested::Branch(children) => {
            let mut out = BTreeMap::new();
            let mut path = Vec::new();
            flatten_into(children, &mut path, &key_fn, &mut out);
            Flat::Map(out)
        }
    }
}

fn flatten_into<K, V, K2, F>(
    children: BTreeMap<K, Nested<K, V>>,
    path: &mut Vec<K>,
    key_fn: &F,
    out: &mut BTreeMap<K2, V>,
) where
    K: Ord + Clone,
    K2: Ord,
    F: Fn(Vec<K>) -> K2,
{
    for (key, child) in children {
        path.push(key);
        match child {
            Nested::Leaf(value) => {
                out.insert(key_fn(path.clone()), value);
            }
            Nested::Branch(grandchildren) => flatten_into(grandchildren, path, key_fn, out),
        }
        path.pop();
    }
}

/// Partition `entries` by a derived key, keeping each group's raw sub-map.
pub fn group_by<K, V, G, F>(entries: BTreeMap<K, V>, key_fn: F) -> BTreeMap<G, BTreeMap<K, V>>
where
    K: Ord,
    G: Ord,
    F: Fn(&K, &V) -> G,
{
    let mut groups: BTreeMap<G, BTreeMap<K, V>> = BTreeMap::new();
    for (key, value) in entries {
        groups
            .entry(key_fn(&key, &value))
            .or_default()
            .insert(key, value);
    }
    groups
}

/// [`group_by`] followed by `reducer` over every group.
pub fn group_by_reduce<K, V, G, R, F, Rd>(
    entries: BTreeMap<K, V>,
    key_fn: F,
    reducer: Rd,
) -> BTreeMap<G, R>
where
    K: Ord,
    G: Ord,
    F: Fn(&K, &V) -> G,
    Rd: Fn(BTreeMap<K, V>) -> R,
{
    group_by(entries, key_fn)
        .into_iter()
        .map(|(group, members)| (group, reducer(members)))
        .collect()
}

/// Collapse `group -> sub-key -> value` into `sub-key -> value`.
/// A sub-key seen in several groups keeps the value from the last group.
pub fn group_flatten<G, K, V>(groups: BTreeMap<G, BTreeMap<K, V>>) -> BTreeMap<K, V>
where
    K: Ord,
{
    group_flatten_with(groups, |_, later| later)
}

/// [`group_flatten`] with an explicit `combine(earlier, later)` for
/// recurring sub-keys.
pub fn group_flatten_with<G, K, V, C>(
    groups: BTreeMap<G, BTreeMap<K, V>>,
    combine: C,
) -> BTreeMap<K, V>
where
    K: Ord,
    C: Fn(V, V) -> V,
{
    let mut out: BTreeMap<K, V> = BTreeMap::new();
    for (_, members) in groups {
        for (key, value) in members {
            let merged = match out.remove(&key) {
                Some(earlier) => combine(earlier, value),
                None => value,
            };
            out.insert(key, merged);
        }
    }
    out
}

/// Pair every entry of `left` with the `right` entry at `project(key)`.
///
/// `left` entries without a match are kept with [`Observed::Unavailable`];
/// `right` entries nobody projects onto are ignored. Several `left` keys may
/// project onto the same `right` entry.
pub fn merge_with_fill<K, P, A, B, F>(
    left: BTreeMap<K, A>,
    right: &BTreeMap<P, B>,
    project: F,
) -> BTreeMap<K, (A, Observed<B>)>
where
    K: Ord,
    P: Ord,
    B: Clone,
    F: Fn(&K) -> P,
{
    left.into_iter()
        .map(|(key, value)| {
            let matched = Observed::from(right.get(&project(&key)).cloned());
            (key, (value, matched))
        })
        .collect()
}

//! Keyed map of sorted sets with the ownership rules the engine expects
//! from its embedding server: a key whose set becomes empty is deleted, and
//! a union/intersection destination is fully replaced (or removed when the
//! result is empty).

use once_cell::sync::Lazy;

use crate::algebra::{self, Aggregate, OpSource, SetOp, Weighted};
use crate::config::ZSetConfig;
use crate::zset::SortedSet;
use crate::FastHashMap;

static EMPTY: Lazy<SortedSet> = Lazy::new(SortedSet::default);

pub struct Keyspace {
    sets: FastHashMap<String, SortedSet>,
    config: ZSetConfig,
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::with_config(ZSetConfig::default())
    }
}

impl Keyspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ZSetConfig) -> Self {
        Self {
            sets: FastHashMap::default(),
            config,
        }
    }

    pub fn key_count(&self) -> usize {
        self.sets.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.sets.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.sets.remove(key).is_some()
    }

    /// Runs `f` against the set at `key`, creating it when absent and
    /// deleting the key again when the set comes out empty.
    pub fn with_write<F, R>(&mut self, key: &str, f: F) -> R
    where
        F: FnOnce(&mut SortedSet) -> R,
    {
        let config = self.config;
        let (result, empty) = {
            let set = self
                .sets
                .entry(key.to_owned())
                .or_insert_with(|| SortedSet::new(config));
            let result = f(set);
            (result, set.is_empty())
        };
        if empty {
            self.sets.remove(key);
        }
        result
    }

    /// Runs `f` against the set at `key`, or against a shared empty set
    /// when the key does not exist.
    pub fn with_read<F, R>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(&SortedSet) -> R,
    {
        f(self.sets.get(key).unwrap_or(&EMPTY))
    }

    /// Replaces `dest` with `result`, removing the key instead when the
    /// result is empty. Returns the stored cardinality.
    pub fn store(&mut self, dest: &str, result: SortedSet) -> usize {
        if result.is_empty() {
            self.sets.remove(dest);
            0
        } else {
            let len = result.len();
            self.sets.insert(dest.to_owned(), result);
            len
        }
    }

    fn op_store(
        &mut self,
        dest: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
        aggregate: Aggregate,
        op: SetOp,
    ) -> usize {
        if let Some(w) = weights {
            assert_eq!(w.len(), keys.len(), "one weight per source key");
        }
        let result = {
            let sources: Vec<Weighted<'_>> = keys
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let source = match self.sets.get(*key) {
                        Some(set) => OpSource::Sorted(set),
                        None => OpSource::Empty,
                    };
                    match weights {
                        Some(w) => Weighted::with_weight(source, w[i]),
                        None => Weighted::new(source),
                    }
                })
                .collect();
            algebra::union_or_intersect(&sources, aggregate, op, self.config)
        };
        self.store(dest, result)
    }

    /// ZUNIONSTORE over keys of this keyspace.
    pub fn union_store(
        &mut self,
        dest: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
        aggregate: Aggregate,
    ) -> usize {
        self.op_store(dest, keys, weights, aggregate, SetOp::Union)
    }

    /// ZINTERSTORE over keys of this keyspace.
    pub fn inter_store(
        &mut self,
        dest: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
        aggregate: Aggregate,
    ) -> usize {
        self.op_store(dest, keys, weights, aggregate, SetOp::Inter)
    }
}

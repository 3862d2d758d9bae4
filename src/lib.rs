//! In-memory sorted-set engine: a packed encoding for small sets, a
//! span-tracking skiplist plus member index for large ones, range queries
//! over score, member and rank, and weighted union/intersection over
//! heterogeneous set sources.
#![deny(clippy::uninlined_format_args)]
#![deny(clippy::to_string_in_format_args)]

pub mod algebra;
pub mod compact;
pub mod config;
pub mod error;
pub mod expanded;
pub mod format;
pub mod keyspace;
pub mod packed;
pub mod range;
pub mod skiplist;
pub mod zset;

pub use algebra::{intersect, union, union_or_intersect, Aggregate, OpSource, PlainSet, SetOp, Weighted};
pub use config::ZSetConfig;
pub use error::{Result, ZSetError};
pub use keyspace::Keyspace;
pub use range::{LexBound, LexRange, ScoreRange};
pub use zset::{AddFlags, AddOutcome, Encoding, SortedSet};

// Member strings may carry user data; keep the keyed hasher.
/// Hash map used for member-keyed tables across the crate.
pub type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
pub type FastHashSet<T> = hashbrown::HashSet<T, ahash::RandomState>;

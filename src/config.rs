/// Thresholds governing the compact-to-skiplist encoding conversion.
///
/// A sorted set stays in the packed encoding while its cardinality is at most
/// `max_compact_entries` and every member is at most `max_compact_value`
/// bytes. Crossing either bound converts it to the skiplist encoding; the
/// conversion back only happens for freshly built union/intersection results
/// that fit under both bounds again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZSetConfig {
    pub max_compact_entries: usize,
    pub max_compact_value: usize,
}

impl Default for ZSetConfig {
    fn default() -> Self {
        Self {
            max_compact_entries: 128,
            max_compact_value: 64,
        }
    }
}

impl ZSetConfig {
    pub fn new(max_compact_entries: usize, max_compact_value: usize) -> Self {
        Self {
            max_compact_entries,
            max_compact_value,
        }
    }

    /// Config under which every set uses the skiplist encoding from the
    /// first insert. Mostly useful in tests.
    pub fn always_expanded() -> Self {
        Self::new(0, 0)
    }
}

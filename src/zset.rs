//! The sorted set: a tagged pair of representations behind one contract.
//!
//! Small sets live in the packed encoding; crossing the configured
//! cardinality or member-length threshold converts them to the skiplist
//! encoding. The conversion is one-way; only freshly built set-algebra
//! results are shrunk back down when they fit.

use std::mem;

use tracing::trace;

use crate::compact::PackedZSet;
use crate::config::ZSetConfig;
use crate::error::{Result, ZSetError};
use crate::expanded::SkipZSet;
use crate::range::{normalize_rank_range, LexRange, ScoreRange};

/// Which representation a set currently uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Packed,
    Skip,
}

enum Repr {
    Packed(PackedZSet),
    Skip(SkipZSet),
}

/// Behavior switches for [`SortedSet::add`].
///
/// `nx`/`xx` and `gt`/`lt` are mutually exclusive pairs, and `nx` cannot be
/// combined with `gt` or `lt`; violating that is a caller bug, not an input
/// error.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddFlags {
    /// Only add new members, never touch existing ones.
    pub nx: bool,
    /// Only update existing members, never add.
    pub xx: bool,
    /// Only update when the new score is greater than the current one.
    pub gt: bool,
    /// Only update when the new score is less than the current one.
    pub lt: bool,
    /// Treat the score as a delta on the current score (0 when absent).
    pub incr: bool,
}

impl AddFlags {
    pub const INCR: Self = Self {
        nx: false,
        xx: false,
        gt: false,
        lt: false,
        incr: true,
    };
}

/// What an [`SortedSet::add`] call did.
///
/// `score` carries the member's score after the call and is `None` exactly
/// when the operation was blocked by a conditional flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddOutcome {
    pub added: bool,
    pub updated: bool,
    pub score: Option<f64>,
}

impl AddOutcome {
    /// The operation was blocked by NX/XX/GT/LT.
    pub const BLOCKED: Self = Self {
        added: false,
        updated: false,
        score: None,
    };
}

pub struct SortedSet {
    repr: Repr,
    config: ZSetConfig,
}

impl Default for SortedSet {
    fn default() -> Self {
        Self::new(ZSetConfig::default())
    }
}

impl SortedSet {
    /// Creates an empty set in the packed encoding.
    pub fn new(config: ZSetConfig) -> Self {
        Self {
            repr: Repr::Packed(PackedZSet::new()),
            config,
        }
    }

    pub(crate) fn from_skip(set: SkipZSet, config: ZSetConfig) -> Self {
        Self {
            repr: Repr::Skip(set),
            config,
        }
    }

    pub fn config(&self) -> ZSetConfig {
        self.config
    }

    pub fn encoding(&self) -> Encoding {
        match &self.repr {
            Repr::Packed(_) => Encoding::Packed,
            Repr::Skip(_) => Encoding::Skip,
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Packed(p) => p.len(),
            Repr::Skip(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, member: &str) -> bool {
        match &self.repr {
            Repr::Packed(p) => p.contains(member),
            Repr::Skip(s) => s.contains(member),
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        match &self.repr {
            Repr::Packed(p) => p.score(member),
            Repr::Skip(s) => s.score(member),
        }
    }

    /// Adds a member or updates its score, honoring the flags. A NaN input
    /// score, or an increment whose result is NaN, is rejected with no
    /// mutation.
    pub fn add(&mut self, score: f64, member: &str, flags: AddFlags) -> Result<AddOutcome> {
        assert!(!(flags.nx && flags.xx), "NX and XX are mutually exclusive");
        assert!(!(flags.gt && flags.lt), "GT and LT are mutually exclusive");
        assert!(
            !(flags.nx && (flags.gt || flags.lt)),
            "NX cannot be combined with GT or LT"
        );
        if score.is_nan() {
            return Err(ZSetError::NanScore);
        }

        match self.score(member) {
            Some(current) => {
                if flags.nx {
                    return Ok(AddOutcome::BLOCKED);
                }
                let new = if flags.incr {
                    let s = current + score;
                    if s.is_nan() {
                        return Err(ZSetError::NanScore);
                    }
                    s
                } else {
                    score
                };
                if (flags.gt && new <= current) || (flags.lt && new >= current) {
                    return Ok(AddOutcome::BLOCKED);
                }
                let updated = new != current;
                if updated {
                    match &mut self.repr {
                        Repr::Packed(p) => {
                            p.remove(member);
                            p.insert(new, member);
                        }
                        Repr::Skip(s) => s.update(member, new),
                    }
                }
                Ok(AddOutcome {
                    added: false,
                    updated,
                    score: Some(new),
                })
            }
            None => {
                if flags.xx {
                    return Ok(AddOutcome::BLOCKED);
                }
                match &mut self.repr {
                    Repr::Packed(p) => p.insert(score, member),
                    Repr::Skip(s) => s.insert(score, member),
                }
                if self.len() > self.config.max_compact_entries
                    || member.len() > self.config.max_compact_value
                {
                    self.convert_to_skip();
                }
                Ok(AddOutcome {
                    added: true,
                    updated: false,
                    score: Some(score),
                })
            }
        }
    }

    /// ZINCRBY: adds `delta` to the member's score, seeding absent members
    /// at 0. Returns the resulting score, or `None` when blocked by a flag.
    pub fn incr_by(&mut self, delta: f64, member: &str) -> Result<Option<f64>> {
        Ok(self.add(delta, member, AddFlags::INCR)?.score)
    }

    pub fn remove(&mut self, member: &str) -> bool {
        match &mut self.repr {
            Repr::Packed(p) => p.remove(member),
            Repr::Skip(s) => s.remove(member),
        }
    }

    /// 0-based rank; `reverse` ranks from the highest score down.
    pub fn rank(&self, member: &str, reverse: bool) -> Option<usize> {
        match &self.repr {
            Repr::Packed(p) => p.rank(member, reverse),
            Repr::Skip(s) => s.rank(member, reverse),
        }
    }

    /// Positional access; `rank` is 0-based ascending.
    pub fn get_by_rank(&self, rank: usize) -> Option<(&str, f64)> {
        match &self.repr {
            Repr::Packed(p) => p.get_by_rank(rank),
            Repr::Skip(s) => s.get_by_rank(rank),
        }
    }

    /// Inclusive rank window with negative-from-the-end indices, ascending
    /// or descending.
    pub fn range_by_rank(&self, start: i64, stop: i64, reverse: bool) -> Vec<(String, f64)> {
        let Some((start, stop)) = normalize_rank_range(start, stop, self.len()) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(stop - start + 1);
        for i in start..=stop {
            let rank = if reverse { self.len() - i - 1 } else { i };
            let (m, s) = self.get_by_rank(rank).expect("normalized rank in bounds");
            out.push((m.to_owned(), s));
        }
        out
    }

    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        reverse: bool,
        offset: usize,
        limit: Option<usize>,
    ) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        match &self.repr {
            Repr::Packed(p) => p.range_by_score(range, reverse, offset, limit, &mut out),
            Repr::Skip(s) => s.range_by_score(range, reverse, offset, limit, &mut out),
        }
        out
    }

    pub fn count_by_score(&self, range: &ScoreRange) -> usize {
        match &self.repr {
            Repr::Packed(p) => p.count_by_score(range),
            Repr::Skip(s) => s.count_by_score(range),
        }
    }

    /// Lexicographic window. Only meaningful when every member holds the
    /// same score; with mixed scores the result is unspecified (but memory
    /// safe).
    pub fn range_by_lex(
        &self,
        range: &LexRange,
        reverse: bool,
        offset: usize,
        limit: Option<usize>,
    ) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        match &self.repr {
            Repr::Packed(p) => p.range_by_lex(range, reverse, offset, limit, &mut out),
            Repr::Skip(s) => s.range_by_lex(range, reverse, offset, limit, &mut out),
        }
        out
    }

    pub fn count_by_lex(&self, range: &LexRange) -> usize {
        match &self.repr {
            Repr::Packed(p) => p.count_by_lex(range),
            Repr::Skip(s) => s.count_by_lex(range),
        }
    }

    pub fn remove_range_by_score(&mut self, range: &ScoreRange) -> usize {
        match &mut self.repr {
            Repr::Packed(p) => p.remove_range_by_score(range),
            Repr::Skip(s) => s.remove_range_by_score(range),
        }
    }

    pub fn remove_range_by_lex(&mut self, range: &LexRange) -> usize {
        match &mut self.repr {
            Repr::Packed(p) => p.remove_range_by_lex(range),
            Repr::Skip(s) => s.remove_range_by_lex(range),
        }
    }

    /// Inclusive rank window removal with negative-index normalization.
    pub fn remove_range_by_rank(&mut self, start: i64, stop: i64) -> usize {
        let Some((start, stop)) = normalize_rank_range(start, stop, self.len()) else {
            return 0;
        };
        match &mut self.repr {
            Repr::Packed(p) => p.remove_range_by_rank(start + 1, stop + 1),
            Repr::Skip(s) => s.remove_range_by_rank(start + 1, stop + 1),
        }
    }

    /// Pops up to `count` elements from the low (`min`) or high end.
    pub fn pop(&mut self, min: bool, count: usize) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(count.min(self.len()));
        for _ in 0..count {
            let popped = match &mut self.repr {
                Repr::Packed(p) => p.pop(min),
                Repr::Skip(s) => s.pop(min),
            };
            match popped {
                Some(item) => out.push(item),
                None => break,
            }
        }
        out
    }

    pub fn pop_min(&mut self, count: usize) -> Vec<(String, f64)> {
        self.pop(true, count)
    }

    pub fn pop_max(&mut self, count: usize) -> Vec<(String, f64)> {
        self.pop(false, count)
    }

    /// Ascending iteration over `(member, score)`.
    pub fn iter(&self) -> Iter<'_> {
        match &self.repr {
            Repr::Packed(p) => Iter::Packed(p.pairs()),
            Repr::Skip(s) => Iter::Skip(s.iter()),
        }
    }

    /// Rough heap footprint of the set.
    pub fn mem_bytes(&self) -> usize {
        match &self.repr {
            Repr::Packed(p) => p.mem_bytes(),
            Repr::Skip(s) => s.mem_bytes(),
        }
    }

    fn max_member_len(&self) -> usize {
        match &self.repr {
            Repr::Packed(p) => p.max_member_len(),
            Repr::Skip(s) => s.max_member_len(),
        }
    }

    /// Converts the packed encoding to the skiplist one. A duplicate member
    /// in the packed sequence means the structure is corrupt and panics.
    pub fn convert_to_skip(&mut self) {
        let Repr::Packed(packed) = &self.repr else {
            return;
        };
        trace!(len = packed.len(), "converting sorted set to skiplist encoding");
        let mut skip = SkipZSet::new();
        for (_, member, score) in packed.pairs() {
            // insert panics on a duplicate, which here means the packed
            // sequence itself is corrupt
            skip.insert(score, member);
        }
        self.repr = Repr::Skip(skip);
    }

    /// Converts the skiplist encoding to the packed one, releasing the index
    /// before draining the nodes in order.
    pub fn convert_to_packed(&mut self) {
        if self.encoding() == Encoding::Packed {
            return;
        }
        let repr = mem::replace(&mut self.repr, Repr::Packed(PackedZSet::new()));
        let Repr::Skip(skip) = repr else {
            unreachable!("encoding checked above")
        };
        trace!(len = skip.len(), "converting sorted set to packed encoding");
        let Repr::Packed(packed) = &mut self.repr else {
            unreachable!("representation was just replaced")
        };
        for (member, score) in skip.into_items() {
            packed.push_back(score, &member);
        }
    }

    /// Shrinks a skiplist-encoded set back down when it fits the packed
    /// thresholds. Used on freshly built union/intersection results.
    pub fn convert_to_packed_if_fit(&mut self) {
        if self.encoding() == Encoding::Packed {
            return;
        }
        if self.len() <= self.config.max_compact_entries
            && self.max_member_len() <= self.config.max_compact_value
        {
            self.convert_to_packed();
        }
    }
}

pub enum Iter<'a> {
    Packed(crate::compact::Pairs<'a>),
    Skip(crate::skiplist::Iter<'a>),
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Packed(p) => p.next().map(|(_, m, s)| (m, s)),
            Iter::Skip(s) => s.next(),
        }
    }
}

//! Union and intersection over heterogeneous set sources.
//!
//! A source is a plain set (integer or hash encoding, every member scoring
//! an implicit 1.0) or a sorted set in either encoding. One cursor type
//! spans all four shapes so the algebra below never branches on what it is
//! iterating. Results are built in the skiplist encoding and shrunk to the
//! packed one when they fit.

use std::borrow::Cow;
use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::ZSetConfig;
use crate::expanded::SkipZSet;
use crate::zset::SortedSet;
use crate::FastHashSet;

/// How scores of a member appearing in several sources are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

impl Aggregate {
    /// Combines an accumulated score with the next weighted score. Adding
    /// `+inf` and `-inf` yields NaN; the convention is 0.0, not propagation.
    pub fn combine(self, target: f64, value: f64) -> f64 {
        match self {
            Aggregate::Sum => {
                let sum = target + value;
                if sum.is_nan() {
                    0.0
                } else {
                    sum
                }
            }
            Aggregate::Min => {
                if value < target {
                    value
                } else {
                    target
                }
            }
            Aggregate::Max => {
                if value > target {
                    value
                } else {
                    target
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    Inter,
}

/// A plain (unordered) set usable as an algebra operand. Kept deliberately
/// minimal: the full plain-set type lives outside this engine.
pub enum PlainSet {
    /// Sorted, deduplicated integers.
    Ints(Vec<i64>),
    Members(FastHashSet<String>),
}

fn parse_int_member(s: &str) -> Option<i64> {
    s.parse().ok().filter(|i: &i64| i.to_string() == s)
}

impl PlainSet {
    pub fn from_ints(mut ints: Vec<i64>) -> Self {
        ints.sort_unstable();
        ints.dedup();
        Self::Ints(ints)
    }

    pub fn from_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::Members(members.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ints(v) => v.len(),
            Self::Members(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, member: &str) -> bool {
        match self {
            Self::Ints(v) => match parse_int_member(member) {
                Some(i) => v.binary_search(&i).is_ok(),
                None => false,
            },
            Self::Members(s) => s.contains(member),
        }
    }
}

/// One operand of a union/intersection. `Empty` stands in for a missing
/// key.
#[derive(Clone, Copy)]
pub enum OpSource<'a> {
    Empty,
    Plain(&'a PlainSet),
    Sorted(&'a SortedSet),
}

impl<'a> OpSource<'a> {
    pub fn len(&self) -> usize {
        match self {
            OpSource::Empty => 0,
            OpSource::Plain(p) => p.len(),
            OpSource::Sorted(z) => z.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership probe; plain-set members score 1.0.
    pub fn find(&self, member: &str) -> Option<f64> {
        match self {
            OpSource::Empty => None,
            OpSource::Plain(p) => p.contains(member).then_some(1.0),
            OpSource::Sorted(z) => z.score(member),
        }
    }

    pub fn iter(&self) -> SourceIter<'a> {
        match *self {
            OpSource::Empty => SourceIter::Done,
            OpSource::Plain(PlainSet::Ints(v)) => SourceIter::Ints(v.iter()),
            OpSource::Plain(PlainSet::Members(s)) => SourceIter::Members(s.iter()),
            OpSource::Sorted(z) => match z.iter() {
                crate::zset::Iter::Packed(p) => SourceIter::Packed(p),
                crate::zset::Iter::Skip(i) => SourceIter::Skip(i),
            },
        }
    }

    /// Whether both operands reference the same underlying object (the same
    /// key given twice).
    fn same_as(&self, other: &OpSource<'_>) -> bool {
        match (self, other) {
            (OpSource::Plain(a), OpSource::Plain(b)) => std::ptr::eq(*a, *b),
            (OpSource::Sorted(a), OpSource::Sorted(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// A source plus its score multiplier.
pub struct Weighted<'a> {
    pub source: OpSource<'a>,
    pub weight: f64,
}

impl<'a> Weighted<'a> {
    pub fn new(source: OpSource<'a>) -> Self {
        Self {
            source,
            weight: 1.0,
        }
    }

    pub fn with_weight(source: OpSource<'a>, weight: f64) -> Self {
        Self { source, weight }
    }
}

/// Cursor over any operand kind, yielding `(member, score)`. Plain-set
/// members synthesize a 1.0 score; integer members render to their decimal
/// form on the fly.
pub enum SourceIter<'a> {
    Done,
    Ints(std::slice::Iter<'a, i64>),
    Members(hashbrown::hash_set::Iter<'a, String>),
    Packed(crate::compact::Pairs<'a>),
    Skip(crate::skiplist::Iter<'a>),
}

impl<'a> Iterator for SourceIter<'a> {
    type Item = (Cow<'a, str>, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SourceIter::Done => None,
            SourceIter::Ints(it) => it.next().map(|i| (Cow::Owned(i.to_string()), 1.0)),
            SourceIter::Members(it) => it.next().map(|m| (Cow::Borrowed(m.as_str()), 1.0)),
            SourceIter::Packed(it) => it.next().map(|(_, m, s)| (Cow::Borrowed(m), s)),
            SourceIter::Skip(it) => it.next().map(|(m, s)| (Cow::Borrowed(m), s)),
        }
    }
}

#[inline]
fn weighted(weight: f64, score: f64) -> f64 {
    let value = weight * score;
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Computes the weighted, aggregated union or intersection of `sources`.
///
/// Sources are probed in ascending cardinality order; for an intersection
/// an empty smallest source short-circuits the whole operation, and a
/// member absent from any source is discarded without probing the rest.
pub fn union_or_intersect(
    sources: &[Weighted<'_>],
    aggregate: Aggregate,
    op: SetOp,
    config: ZSetConfig,
) -> SortedSet {
    assert!(!sources.is_empty(), "at least one input source is required");
    let mut srcs: Vec<&Weighted<'_>> = sources.iter().collect();
    srcs.sort_by_key(|w| w.source.len());

    let mut out = SkipZSet::new();
    match op {
        SetOp::Inter => {
            if !srcs[0].source.is_empty() {
                'members: for (member, score) in srcs[0].source.iter() {
                    let mut agg = weighted(srcs[0].weight, score);
                    for w in &srcs[1..] {
                        // the same key twice: membership is already known
                        let value = if w.source.same_as(&srcs[0].source) {
                            weighted(w.weight, score)
                        } else if let Some(found) = w.source.find(member.as_ref()) {
                            weighted(w.weight, found)
                        } else {
                            continue 'members;
                        };
                        agg = aggregate.combine(agg, value);
                    }
                    out.insert(agg, member.as_ref());
                }
            }
        }
        SetOp::Union => {
            let mut acc: FxHashMap<String, f64> = FxHashMap::default();
            // the union is at least as large as the largest input
            acc.reserve(srcs.last().map_or(0, |w| w.source.len()));
            for w in &srcs {
                for (member, score) in w.source.iter() {
                    let value = weighted(w.weight, score);
                    match acc.entry(member.into_owned()) {
                        Entry::Occupied(mut e) => {
                            let existing = e.get_mut();
                            *existing = aggregate.combine(*existing, value);
                        }
                        Entry::Vacant(e) => {
                            e.insert(value);
                        }
                    }
                }
            }
            for (member, score) in acc {
                out.insert(score, &member);
            }
        }
    }

    let mut result = SortedSet::from_skip(out, config);
    result.convert_to_packed_if_fit();
    debug!(?op, len = result.len(), "set algebra result built");
    result
}

pub fn union(sources: &[Weighted<'_>], aggregate: Aggregate, config: ZSetConfig) -> SortedSet {
    union_or_intersect(sources, aggregate, SetOp::Union, config)
}

pub fn intersect(sources: &[Weighted<'_>], aggregate: Aggregate, config: ZSetConfig) -> SortedSet {
    union_or_intersect(sources, aggregate, SetOp::Inter, config)
}

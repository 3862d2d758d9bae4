//! Skiplist encoding of a sorted set: the span-tracking [`SkipList`] paired
//! with a member index for O(1) member lookups.
//!
//! A member string is allocated once and shared: the skiplist node and the
//! index key hold the two references. Removal drops the index entry first,
//! then the skiplist node, so the index never outlives the node it points
//! at.

use std::sync::Arc;

use crate::range::{LexRange, ScoreRange};
use crate::skiplist::{NodeId, SkipList};
use crate::FastHashMap;

/// Member lookup table of the skiplist encoding. Values are arena ids of the
/// node currently holding the member; the score lives in the node only.
pub type MemberIndex = FastHashMap<Arc<str>, NodeId>;

#[derive(Default)]
pub struct SkipZSet {
    list: SkipList,
    index: MemberIndex,
}

impl SkipZSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    #[inline]
    pub fn contains(&self, member: &str) -> bool {
        self.index.contains_key(member)
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        let id = *self.index.get(member)?;
        Some(self.list.score(id))
    }

    /// Inserts a member known to be absent.
    pub fn insert(&mut self, score: f64, member: &str) {
        let member: Arc<str> = Arc::from(member);
        let id = self.list.insert(score, Arc::clone(&member));
        let prev = self.index.insert(member, id);
        assert!(prev.is_none(), "duplicate insert into skiplist encoding");
    }

    /// Rewrites the score of an existing member, relocating the node when
    /// the new score changes its position.
    pub fn update(&mut self, member: &str, newscore: f64) {
        let id = *self
            .index
            .get(member)
            .expect("updated member must be indexed");
        let curscore = self.list.score(id);
        let new_id = self.list.update_score(curscore, member, newscore);
        if new_id != id {
            *self
                .index
                .get_mut(member)
                .expect("updated member must be indexed") = new_id;
        }
    }

    pub fn remove(&mut self, member: &str) -> bool {
        // The index entry goes first; the skiplist delete then drops the
        // node and with it the last live use of the shared member string.
        let Some((key, id)) = self.index.remove_entry(member) else {
            return false;
        };
        let score = self.list.score(id);
        drop(key);
        let deleted = self.list.delete(score, member);
        assert!(deleted, "member index and skiplist out of sync");
        true
    }

    /// 0-based rank; `reverse` counts from the highest score.
    pub fn rank(&self, member: &str, reverse: bool) -> Option<usize> {
        let id = *self.index.get(member)?;
        let score = self.list.score(id);
        let rank = self
            .list
            .rank(score, member)
            .expect("indexed member must have a rank");
        if reverse {
            Some(self.list.len() - rank)
        } else {
            Some(rank - 1)
        }
    }

    pub fn get_by_rank(&self, rank: usize) -> Option<(&str, f64)> {
        let id = self.list.element_by_rank(rank + 1)?;
        Some((self.list.member(id), self.list.score(id)))
    }

    /// Emits members of the score range in rank order, after skipping
    /// `offset` and stopping at `limit` matches. The walk exits the moment a
    /// node leaves the range.
    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        reverse: bool,
        offset: usize,
        limit: Option<usize>,
        out: &mut Vec<(String, f64)>,
    ) {
        let mut cursor = if reverse {
            self.list.last_in_range(range)
        } else {
            self.list.first_in_range(range)
        };
        let mut skip = offset;
        let mut remaining = limit.unwrap_or(usize::MAX);
        while let Some(id) = cursor {
            let score = self.list.score(id);
            let in_range = if reverse {
                range.gte_min(score)
            } else {
                range.lte_max(score)
            };
            if !in_range || remaining == 0 {
                break;
            }
            if skip > 0 {
                skip -= 1;
            } else {
                out.push((self.list.member(id).to_owned(), score));
                remaining -= 1;
            }
            cursor = if reverse {
                self.list.prev(id)
            } else {
                self.list.next(id)
            };
        }
    }

    /// Counts the range via the rank of its two boundary nodes rather than a
    /// walk.
    pub fn count_by_score(&self, range: &ScoreRange) -> usize {
        let Some(first) = self.list.first_in_range(range) else {
            return 0;
        };
        let first_rank = self
            .list
            .rank(self.list.score(first), self.list.member(first))
            .expect("boundary node must have a rank");
        let mut count = self.list.len() - (first_rank - 1);
        if let Some(last) = self.list.last_in_range(range) {
            let last_rank = self
                .list
                .rank(self.list.score(last), self.list.member(last))
                .expect("boundary node must have a rank");
            count -= self.list.len() - last_rank;
        }
        count
    }

    pub fn range_by_lex(
        &self,
        range: &LexRange,
        reverse: bool,
        offset: usize,
        limit: Option<usize>,
        out: &mut Vec<(String, f64)>,
    ) {
        let mut cursor = if reverse {
            self.list.last_in_lex_range(range)
        } else {
            self.list.first_in_lex_range(range)
        };
        let mut skip = offset;
        let mut remaining = limit.unwrap_or(usize::MAX);
        while let Some(id) = cursor {
            let member = self.list.member(id);
            let in_range = if reverse {
                range.gte_min(member)
            } else {
                range.lte_max(member)
            };
            if !in_range || remaining == 0 {
                break;
            }
            if skip > 0 {
                skip -= 1;
            } else {
                out.push((member.to_owned(), self.list.score(id)));
                remaining -= 1;
            }
            cursor = if reverse {
                self.list.prev(id)
            } else {
                self.list.next(id)
            };
        }
    }

    pub fn count_by_lex(&self, range: &LexRange) -> usize {
        let Some(first) = self.list.first_in_lex_range(range) else {
            return 0;
        };
        let first_rank = self
            .list
            .rank(self.list.score(first), self.list.member(first))
            .expect("boundary node must have a rank");
        let mut count = self.list.len() - (first_rank - 1);
        if let Some(last) = self.list.last_in_lex_range(range) {
            let last_rank = self
                .list
                .rank(self.list.score(last), self.list.member(last))
                .expect("boundary node must have a rank");
            count -= self.list.len() - last_rank;
        }
        count
    }

    pub fn remove_range_by_score(&mut self, range: &ScoreRange) -> usize {
        let index = &mut self.index;
        self.list.delete_range_by_score(range, |member| {
            index.remove(member);
        })
    }

    pub fn remove_range_by_lex(&mut self, range: &LexRange) -> usize {
        let index = &mut self.index;
        self.list.delete_range_by_lex(range, |member| {
            index.remove(member);
        })
    }

    /// `start` and `end` are 1-based inclusive ranks.
    pub fn remove_range_by_rank(&mut self, start: usize, end: usize) -> usize {
        let index = &mut self.index;
        self.list.delete_range_by_rank(start, end, |member| {
            index.remove(member);
        })
    }

    pub fn pop(&mut self, min: bool) -> Option<(String, f64)> {
        let id = if min {
            self.list.first()?
        } else {
            self.list.last()?
        };
        let member = self.list.member(id).to_owned();
        let score = self.list.score(id);
        let removed = self.remove(&member);
        debug_assert!(removed);
        Some((member, score))
    }

    pub fn iter(&self) -> crate::skiplist::Iter<'_> {
        self.list.iter()
    }

    pub fn max_member_len(&self) -> usize {
        self.iter().map(|(m, _)| m.len()).max().unwrap_or(0)
    }

    pub fn mem_bytes(&self) -> usize {
        use std::mem::size_of;
        self.list.mem_bytes()
            + self.index.capacity() * size_of::<(Arc<str>, NodeId)>()
    }

    /// Consumes the set in ascending order, tearing the index down before
    /// the nodes are drained.
    pub fn into_items(self) -> crate::skiplist::IntoItems {
        let Self { list, index } = self;
        drop(index);
        list.into_items()
    }
}

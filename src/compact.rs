//! Packed encoding of a sorted set: one [`PackedList`] holding alternating
//! member and score entries, kept sorted ascending by `(score, member)`.
//!
//! Members are stored as strings; a score entry is a native integer when the
//! value is integral and exactly representable, otherwise its canonical
//! decimal rendering. Every operation is a linear scan, which is the point:
//! this encoding only ever holds small sets.

use ryu::Buffer;

use crate::format::{fmt_f64, parse_score};
use crate::packed::{PackedList, Value};
use crate::range::{LexRange, ScoreRange};

/// Largest magnitude at which every integer is exactly representable in f64.
const INT_SCORE_LIMIT: f64 = 9_007_199_254_740_992.0;

#[derive(Default, Clone)]
pub struct PackedZSet {
    seq: PackedList,
}

fn decode_score(value: Value<'_>) -> f64 {
    match value {
        Value::Int(i) => i as f64,
        Value::Str(s) => parse_score(s).expect("packed score entry must be numeric"),
    }
}

fn decode_member(value: Value<'_>) -> &str {
    match value {
        Value::Str(s) => s,
        Value::Int(_) => panic!("packed member entry must be a string"),
    }
}

impl PackedZSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn mem_bytes(&self) -> usize {
        self.seq.mem_bytes()
    }

    /// Iterates `(member_offset, member, score)` in sorted order.
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs {
            seq: &self.seq,
            cursor: self.seq.head(),
        }
    }

    fn find_entry(&self, member: &str) -> Option<(usize, f64)> {
        let mut cursor = self.seq.head();
        while let Some(off) = cursor {
            let soff = self.seq.next(off).expect("member entry must have a score");
            if decode_member(self.seq.value(off)) == member {
                return Some((off, decode_score(self.seq.value(soff))));
            }
            cursor = self.seq.next(soff);
        }
        None
    }

    pub fn contains(&self, member: &str) -> bool {
        self.find_entry(member).is_some()
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.find_entry(member).map(|(_, s)| s)
    }

    fn insert_pair_at(&mut self, at: Option<usize>, score: f64, member: &str) {
        let mut buf = Buffer::new();
        // -0.0 takes the textual path so the sign survives the round trip
        let int_encodable = score.fract() == 0.0
            && score.abs() <= INT_SCORE_LIMIT
            && !(score == 0.0 && score.is_sign_negative());
        let score_value = if int_encodable {
            Value::Int(score as i64)
        } else {
            Value::Str(fmt_f64(&mut buf, score))
        };
        match at {
            Some(off) => {
                self.seq.insert_at(off, Value::Str(member));
                let soff = self
                    .seq
                    .next(off)
                    .expect("inserted member entry must have a successor");
                self.seq.insert_at(soff, score_value);
            }
            None => {
                self.seq.push(Value::Str(member));
                self.seq.push(score_value);
            }
        }
    }

    /// Inserts a member known to be absent, at the position keeping the
    /// sequence sorted by `(score, member)`.
    pub fn insert(&mut self, score: f64, member: &str) {
        let mut at = None;
        for (off, m, s) in self.pairs() {
            if s > score || (s == score && m > member) {
                at = Some(off);
                break;
            }
        }
        self.insert_pair_at(at, score, member);
    }

    /// Appends a pair the caller guarantees sorts after everything present.
    pub fn push_back(&mut self, score: f64, member: &str) {
        self.insert_pair_at(None, score, member);
    }

    pub fn remove(&mut self, member: &str) -> bool {
        match self.find_entry(member) {
            Some((off, _)) => {
                // the score entry slides down to the member's offset
                self.seq.remove_at(off);
                self.seq.remove_at(off);
                true
            }
            None => false,
        }
    }

    /// 0-based rank by linear scan; `reverse` counts from the top.
    pub fn rank(&self, member: &str, reverse: bool) -> Option<usize> {
        let mut rank = 0;
        for (_, m, _) in self.pairs() {
            if m == member {
                return if reverse {
                    Some(self.len() - rank - 1)
                } else {
                    Some(rank)
                };
            }
            rank += 1;
        }
        None
    }

    pub fn get_by_rank(&self, rank: usize) -> Option<(&str, f64)> {
        let off = self.seq.offset(rank.checked_mul(2)?)?;
        let soff = self.seq.next(off).expect("member entry must have a score");
        Some((
            decode_member(self.seq.value(off)),
            decode_score(self.seq.value(soff)),
        ))
    }

    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        reverse: bool,
        offset: usize,
        limit: Option<usize>,
        out: &mut Vec<(String, f64)>,
    ) {
        if range.is_empty_range() {
            return;
        }
        let matching: Vec<(usize, &str, f64)> = if reverse {
            self.pairs().filter(|(_, _, s)| range.contains(*s)).collect()
        } else {
            Vec::new()
        };
        let mut skip = offset;
        let mut remaining = limit.unwrap_or(usize::MAX);
        if reverse {
            for (_, m, s) in matching.into_iter().rev() {
                if remaining == 0 {
                    break;
                }
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                out.push((m.to_owned(), s));
                remaining -= 1;
            }
        } else {
            for (_, m, s) in self.pairs() {
                if !range.gte_min(s) {
                    continue;
                }
                if !range.lte_max(s) || remaining == 0 {
                    break;
                }
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                out.push((m.to_owned(), s));
                remaining -= 1;
            }
        }
    }

    pub fn count_by_score(&self, range: &ScoreRange) -> usize {
        if range.is_empty_range() {
            return 0;
        }
        let mut count = 0;
        for (_, _, s) in self.pairs() {
            if !range.gte_min(s) {
                continue;
            }
            if !range.lte_max(s) {
                break;
            }
            count += 1;
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
        if range.is_empty_range() {
            return;
        }
        let matching: Vec<(usize, &str, f64)> = if reverse {
            self.pairs().filter(|(_, m, _)| range.contains(m)).collect()
        } else {
            Vec::new()
        };
        let mut skip = offset;
        let mut remaining = limit.unwrap_or(usize::MAX);
        if reverse {
            for (_, m, s) in matching.into_iter().rev() {
                if remaining == 0 {
                    break;
                }
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                out.push((m.to_owned(), s));
                remaining -= 1;
            }
        } else {
            for (_, m, s) in self.pairs() {
                if !range.gte_min(m) {
                    continue;
                }
                if !range.lte_max(m) || remaining == 0 {
                    break;
                }
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                out.push((m.to_owned(), s));
                remaining -= 1;
            }
        }
    }

    pub fn count_by_lex(&self, range: &LexRange) -> usize {
        if range.is_empty_range() {
            return 0;
        }
        let mut count = 0;
        for (_, m, _) in self.pairs() {
            if !range.gte_min(m) {
                continue;
            }
            if !range.lte_max(m) {
                break;
            }
            count += 1;
        }
        count
    }

    pub fn remove_range_by_score(&mut self, range: &ScoreRange) -> usize {
        let (start, count) = {
            let mut start = None;
            let mut count = 0;
            for (off, _, s) in self.pairs() {
                if !range.gte_min(s) {
                    continue;
                }
                if !range.lte_max(s) {
                    break;
                }
                start.get_or_insert(off);
                count += 1;
            }
            (start, count)
        };
        if let Some(off) = start {
            self.seq.remove_span(off, count * 2);
        }
        count
    }

    pub fn remove_range_by_lex(&mut self, range: &LexRange) -> usize {
        let (start, count) = {
            let mut start = None;
            let mut count = 0;
            for (off, m, _) in self.pairs() {
                if !range.gte_min(m) {
                    continue;
                }
                if !range.lte_max(m) {
                    break;
                }
                start.get_or_insert(off);
                count += 1;
            }
            (start, count)
        };
        if let Some(off) = start {
            self.seq.remove_span(off, count * 2);
        }
        count
    }

    /// `start` and `end` are 1-based inclusive ranks.
    pub fn remove_range_by_rank(&mut self, start: usize, end: usize) -> usize {
        let Some(off) = self.seq.offset(2 * (start - 1)) else {
            return 0;
        };
        let count = (end - start + 1).min(self.len() - (start - 1));
        self.seq.remove_span(off, 2 * count);
        count
    }

    pub fn pop(&mut self, min: bool) -> Option<(String, f64)> {
        if self.is_empty() {
            return None;
        }
        let rank = if min { 0 } else { self.len() - 1 };
        let (member, score) = {
            let (m, s) = self.get_by_rank(rank).expect("rank is in bounds");
            (m.to_owned(), s)
        };
        let off = self.seq.offset(rank * 2).expect("rank is in bounds");
        self.seq.remove_span(off, 2);
        Some((member, score))
    }

    pub fn max_member_len(&self) -> usize {
        self.pairs().map(|(_, m, _)| m.len()).max().unwrap_or(0)
    }
}

/// Iterator over `(member_offset, member, score)` triples.
pub struct Pairs<'a> {
    seq: &'a PackedList,
    cursor: Option<usize>,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (usize, &'a str, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let off = self.cursor?;
        let soff = self.seq.next(off).expect("member entry must have a score");
        let member = decode_member(self.seq.value(off));
        let score = decode_score(self.seq.value(soff));
        self.cursor = self.seq.next(soff);
        Some((off, member, score))
    }
}

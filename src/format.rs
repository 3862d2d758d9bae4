use ryu::Buffer;
use std::cell::RefCell;

/// Formats a score the way the packed encoding stores it: shortest
/// round-trip decimal, no trailing `.0` for integral values, infinities as
/// `inf` / `-inf`.
#[inline]
pub fn fmt_f64(buf: &mut Buffer, score: f64) -> &str {
    debug_assert!(!score.is_nan());
    if score.is_infinite() {
        return if score > 0.0 { "inf" } else { "-inf" };
    }
    let formatted = buf.format_finite(score);
    formatted.strip_suffix(".0").unwrap_or(formatted)
}

thread_local! {
    static FMT_BUF: RefCell<Buffer> = RefCell::new(Buffer::new());
}

#[inline]
pub fn with_fmt_buf<F, R>(f: F) -> R
where
    F: FnOnce(&mut Buffer) -> R,
{
    FMT_BUF.with(|b| f(&mut b.borrow_mut()))
}

/// Renders a score to an owned string.
pub fn score_to_string(score: f64) -> String {
    with_fmt_buf(|b| fmt_f64(b, score).to_owned())
}

/// Parses a score, accepting the `inf` / `+inf` / `-inf` spellings.
/// NaN is never a valid score.
pub fn parse_score(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

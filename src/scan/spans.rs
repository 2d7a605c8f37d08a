//! Set algebra over sorted, disjoint half-open spans.
//!
//! Used with `usize` for column runs on a grid row and with `f64` for plane
//! intervals when integrating shape factors.

use std::cmp::Ordering;
use std::ops::Range;

/// Sorts spans, drops empty ones and merges overlapping or abutting neighbours.
pub fn normalize<T: Copy + PartialOrd>(spans: &mut Vec<Range<T>>) {
    spans.retain(|s| s.start < s.end);
    spans.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));
    let mut merged: Vec<Range<T>> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => {
                if span.end > last.end {
                    last.end = span.end;
                }
            }
            _ => merged.push(span),
        }
    }
    *spans = merged;
}

/// Parts of `a` not covered by `b`. Both inputs must be normalized.
#[must_use]
pub fn subtract<T: Copy + PartialOrd>(a: &[Range<T>], b: &[Range<T>]) -> Vec<Range<T>> {
    let mut out = Vec::with_capacity(a.len());
    let mut first_cut = 0;
    for span in a {
        let mut start = span.start;
        while first_cut < b.len() && b[first_cut].end <= start {
            first_cut += 1;
        }
        for cut in b[first_cut..].iter().take_while(|cut| cut.start < span.end) {
            if cut.start > start {
                out.push(start..cut.start);
            }
            if cut.end > start {
                start = cut.end;
            }
        }
        if start < span.end {
            out.push(start..span.end);
        }
    }
    out
}

/// Parts of `within` not covered by the normalized `spans`.
#[must_use]
pub fn complement<T: Copy + PartialOrd>(spans: &[Range<T>], within: Range<T>) -> Vec<Range<T>> {
    if within.start < within.end {
        subtract(&[within], spans)
    } else {
        Vec::new()
    }
}

//! Natural ordering for dot-delimited version numbers.
//!
//! Segments are compared left to right. Inside a segment, runs of ASCII digits
//! compare numerically and other runs compare as text, so `1.10 > 1.9`. A
//! missing segment sorts lowest, so `1.2 < 1.2.1`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Run<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn runs(segment: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = segment.as_bytes();

    while start < bytes.len() {
        let digit = bytes[start].is_ascii_digit();
        let end = bytes[start..]
            .iter()
            .position(|b| b.is_ascii_digit() != digit)
            .map_or(bytes.len(), |offset| start + offset);
        let run = &segment[start..end];
        out.push(if digit { Run::Number(run) } else { Run::Text(run) });
        start = end;
    }

    out
}

/// Compare two digit strings by value without parsing, so arbitrarily long
/// segments never overflow.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_run(a: &Run<'_>, b: &Run<'_>) -> Ordering {
    match (a, b) {
        (Run::Number(a), Run::Number(b)) => compare_numeric(a, b),
        (Run::Text(a), Run::Text(b)) => a.cmp(b),
        (Run::Number(_), Run::Text(_)) => Ordering::Less,
        (Run::Text(_), Run::Number(_)) => Ordering::Greater,
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let a_runs = runs(a);
    let b_runs = runs(b);

    for (x, y) in a_runs.iter().zip(b_runs.iter()) {
        let ord = compare_run(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_runs.len().cmp(&b_runs.len())
}

/// Total order over version strings, consistent with string equality.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut a_segments = a.split('.');
    let mut b_segments = b.split('.');

    loop {
        match (a_segments.next(), b_segments.next()) {
            (Some(x), Some(y)) => {
                let ord = compare_segment(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            // Same natural value but different spelling ("1.01" vs "1.1").
            (None, None) => return a.cmp(b),
        }
    }
}

/// Stable sort of `items` by the version number returned from `key`.
pub fn sort_versions<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| compare_versions(key(a), key(b)));
}

use std::collections::HashMap;

use crate::normalize::UrlNormalizer;
use crate::timeline::{Capture, Timeline};

/// A replay query: the URL being revisited plus, when the caller knows it,
/// the capture instant to aim for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub url: String,
    pub timestamp: Option<u64>,
}

impl Query {
    pub fn new(url: impl Into<String>, timestamp: Option<u64>) -> Self {
        Self {
            url: url.into(),
            timestamp,
        }
    }
}

/// Outcome of a lookup. A miss is not an error: `index()` collapses
/// `NotFound` to position 0 so callers always receive a navigable position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Match {
    Found(usize),
    NotFound,
}

impl Match {
    pub fn index(self) -> usize {
        match self {
            Self::Found(index) => index,
            Self::NotFound => 0,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Resolves `query` to the best-matching position in `timeline`.
///
/// Without a timestamp there is no ordering key to bisect on, so the lookup
/// is a linear scan for the first capture whose URL matches the query
/// verbatim or after normalization. With a timestamp, a binary search over
/// the (sorted, possibly duplicated) capture timestamps finds the target
/// instant; a tied group is disambiguated by a forward scan that prefers an
/// exact URL match and otherwise resolves to the capture the bisection first
/// hit.
///
/// Never panics; an empty timeline or an unmatched query yields
/// [`Match::NotFound`].
pub fn locate(timeline: &Timeline, query: &Query, normalizer: &dyn UrlNormalizer) -> Match {
    let captures = timeline.captures();
    if captures.is_empty() {
        return Match::NotFound;
    }

    match query.timestamp {
        None => locate_by_url(captures, &query.url, normalizer),
        Some(target) => locate_by_timestamp(captures, &query.url, target, normalizer),
    }
}

/// [`locate`], collapsed to the plain-index contract: misses land on 0.
pub fn locate_index(timeline: &Timeline, query: &Query, normalizer: &dyn UrlNormalizer) -> usize {
    locate(timeline, query, normalizer).index()
}

fn locate_by_url(captures: &[Capture], url: &str, normalizer: &dyn UrlNormalizer) -> Match {
    let normalized_query = normalizer.normalize(url);
    captures
        .iter()
        .position(|capture| {
            capture.url == url || normalizer.normalize(&capture.url) == normalized_query
        })
        .map_or(Match::NotFound, Match::Found)
}

fn locate_by_timestamp(
    captures: &[Capture],
    url: &str,
    target: u64,
    normalizer: &dyn UrlNormalizer,
) -> Match {
    let mut min_idx = 0usize;
    let mut max_idx = captures.len() - 1;

    while min_idx <= max_idx {
        let cur_idx = (min_idx + max_idx) / 2;
        let capture = &captures[cur_idx];

        if capture.timestamp < target {
            min_idx = cur_idx + 1;
        } else if capture.timestamp > target {
            let Some(next_max) = cur_idx.checked_sub(1) else {
                break;
            };
            max_idx = next_max;
        } else if !urls_match(&capture.url, url, normalizer) {
            // Multiple captures can share a timestamp (multi-frame captures
            // within the same second), and the bisection may land on one
            // whose URL is not the query's. Probe the rest of the tied
            // group for an exact URL before settling.
            return tie_break_forward(captures, cur_idx, target, url);
        } else {
            return Match::Found(cur_idx);
        }
    }

    Match::NotFound
}

// The forward scan accepts verbatim URL equality only; the normalized form
// is consulted solely by the top-level equality check. It also never walks
// backward. Both quirks are carried over from the reference behavior.
fn tie_break_forward(captures: &[Capture], orig_idx: usize, target: u64, url: &str) -> Match {
    let mut idx = orig_idx;
    while idx + 1 < captures.len() && captures[idx + 1].timestamp == target {
        idx += 1;
        if captures[idx].url == url {
            return Match::Found(idx);
        }
    }
    Match::Found(orig_idx)
}

fn urls_match(capture_url: &str, query_url: &str, normalizer: &dyn UrlNormalizer) -> bool {
    capture_url == query_url || normalizer.normalize(capture_url) == normalizer.normalize(query_url)
}

/// Explicit memoization for repeated lookups against the same timeline.
///
/// Entries are keyed by timeline identity plus the query, so a rebuilt
/// timeline never serves positions computed against a previous sequence.
#[derive(Debug, Default)]
pub struct LocateCache {
    entries: HashMap<(u64, Query), Match>,
}

impl LocateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn locate(
        &mut self,
        timeline: &Timeline,
        query: &Query,
        normalizer: &dyn UrlNormalizer,
    ) -> Match {
        *self
            .entries
            .entry((timeline.id(), query.clone()))
            .or_insert_with(|| locate(timeline, query, normalizer))
    }
}

//! Literal substring search over the corpus
//!
//! Matching is case-sensitive containment with no normalization of
//! punctuation or whitespace. An empty query matches every line.

use std::time::Instant;

use tracing::debug;

use crate::config::SearchMode;
use crate::data::{LineMatch, SearchResult, Sonnet};

/// Returns the byte range of every occurrence of `pattern` in `text`
///
/// Overlapping occurrences are all reported, in ascending order. An empty
/// pattern yields no spans.
pub fn find_spans(text: &str, pattern: &str) -> Vec<(usize, usize)> {
    if pattern.is_empty() {
        return Vec::new();
    }

    text.char_indices()
        .filter(|&(i, _)| text[i..].starts_with(pattern))
        .map(|(i, _)| (i, i + pattern.len()))
        .collect()
}

/// Scans every line of every sonnet for `query`
///
/// Matches are appended in corpus order, then line order, and never
/// re-sorted. `elapsed_seconds` on the result covers only this scan.
pub fn search(corpus: &[Sonnet], query: &str) -> SearchResult {
    let start = Instant::now();

    let mut matches = Vec::new();
    let mut matched_sonnet_count = 0;

    for sonnet in corpus {
        let before = matches.len();
        for (idx, line) in sonnet.lines().iter().enumerate() {
            if line.contains(query) {
                matches.push(LineMatch::new(
                    sonnet.title(),
                    idx + 1,
                    line.as_str(),
                    find_spans(line, query),
                ));
            }
        }
        if matches.len() > before {
            matched_sonnet_count += 1;
        }
    }

    finish(query, matches, matched_sonnet_count, start)
}

/// Searches for each whitespace-separated term of `query` and merges by line
///
/// A line matching several terms appears once, carrying the spans of all of
/// them. With `SearchMode::And` a sonnet contributes its lines only when every
/// term occurs somewhere in it; with `SearchMode::Or` any term is enough.
/// A query without terms matches nothing.
pub fn search_terms(corpus: &[Sonnet], query: &str, mode: SearchMode) -> SearchResult {
    let start = Instant::now();
    let terms: Vec<&str> = query.split_whitespace().collect();

    let mut matches = Vec::new();
    let mut matched_sonnet_count = 0;

    if !terms.is_empty() {
        for sonnet in corpus {
            let mut term_found = vec![false; terms.len()];
            let mut sonnet_matches = Vec::new();

            for (idx, line) in sonnet.lines().iter().enumerate() {
                let mut spans = Vec::new();
                for (term_idx, term) in terms.iter().enumerate() {
                    let found = find_spans(line, term);
                    if !found.is_empty() {
                        term_found[term_idx] = true;
                        spans.extend(found);
                    }
                }
                if !spans.is_empty() {
                    spans.sort_unstable();
                    spans.dedup();
                    sonnet_matches.push(LineMatch::new(sonnet.title(), idx + 1, line.as_str(), spans));
                }
            }

            let qualifies = match mode {
                SearchMode::And => term_found.iter().all(|&found| found),
                SearchMode::Or => !sonnet_matches.is_empty(),
            };
            if qualifies {
                matched_sonnet_count += 1;
                matches.extend(sonnet_matches);
            }
        }
    }

    finish(query, matches, matched_sonnet_count, start)
}

fn finish(
    query: &str,
    matches: Vec<LineMatch>,
    matched_sonnet_count: usize,
    start: Instant,
) -> SearchResult {
    let elapsed_seconds = start.elapsed().as_secs_f64();
    debug!(
        query,
        matches = matches.len(),
        sonnets = matched_sonnet_count,
        elapsed_seconds,
        "Search finished"
    );

    SearchResult::new(query, matches, matched_sonnet_count, elapsed_seconds)
}

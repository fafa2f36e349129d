//! Text search over a loaded document
//!
//! Case-insensitive substring scanning of every text run, page by page.
//! After a hit at character `i` the scan resumes at `i + 1`, so overlapping
//! occurrences are all reported (`"aa"` in `"aaaa"` gives three matches).
//! [`SearchOptions::overlapping`] switches to resuming after the match.

use crate::document::{DocumentSession, TextRun};
use crate::error::{Result, ViewerError};

use super::results::{SearchMatch, SearchResultSet};

/// Search options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Resume scanning one character after each hit instead of after the match
    pub overlapping: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { overlapping: true }
    }
}

/// Result of a search request
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query: any existing highlights must be removed
    Cleared,
    /// Query was scanned against every page
    Searched {
        results: SearchResultSet,
        /// Pages whose text could not be fetched
        skipped_pages: Vec<u32>,
    },
}

impl SearchOutcome {
    pub fn is_cleared(&self) -> bool {
        matches!(self, SearchOutcome::Cleared)
    }

    pub fn results(&self) -> Option<&SearchResultSet> {
        match self {
            SearchOutcome::Cleared => None,
            SearchOutcome::Searched { results, .. } => Some(results),
        }
    }

    /// The result set to display; empty for a cleared search
    pub fn into_results(self) -> SearchResultSet {
        match self {
            SearchOutcome::Cleared => SearchResultSet::empty(),
            SearchOutcome::Searched { results, .. } => results,
        }
    }
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Case-fold text one character at a time so offsets stay aligned with the
/// original string
pub fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

/// Folded query, or `None` for an empty / whitespace-only query
pub fn normalize_query(query: &str) -> Option<Vec<char>> {
    if query.trim().is_empty() {
        None
    } else {
        Some(fold(query))
    }
}

/// Character ranges of `needle` (already folded) in `text`
pub fn find_in_text(text: &str, needle: &[char], options: SearchOptions) -> Vec<(usize, usize)> {
    let haystack = fold(text);
    let mut found = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return found;
    }

    let mut cursor = 0;
    while cursor + needle.len() <= haystack.len() {
        match haystack[cursor..]
            .windows(needle.len())
            .position(|window| window == needle)
        {
            Some(offset) => {
                let start = cursor + offset;
                let end = start + needle.len();
                found.push((start, end));
                cursor = if options.overlapping { start + 1 } else { end };
            }
            None => break,
        }
    }
    found
}

/// Matches on one page, in run order then offset order
pub fn scan_page(
    page_number: u32,
    runs: &[TextRun],
    needle: &[char],
    options: SearchOptions,
) -> Vec<SearchMatch> {
    runs.iter()
        .enumerate()
        .flat_map(|(run_index, run)| {
            find_in_text(&run.text, needle, options)
                .into_iter()
                .map(move |(start, end)| SearchMatch {
                    page_number,
                    run_index,
                    run: run.clone(),
                    start,
                    end,
                })
        })
        .collect()
}

/// Search every page of the session's document.
///
/// Runs to completion once started. Pages whose text content cannot be
/// fetched are logged and skipped; the search still succeeds with whatever
/// the other pages produced.
pub async fn search(
    session: &DocumentSession,
    query: &str,
    options: SearchOptions,
) -> Result<SearchOutcome> {
    let Some(needle) = normalize_query(query) else {
        tracing::debug!("Blank query, clearing search");
        return Ok(SearchOutcome::Cleared);
    };
    let document = session.document().ok_or(ViewerError::NoDocument)?;

    let mut matches = Vec::new();
    let mut skipped_pages = Vec::new();

    for page_number in 1..=document.page_count() {
        match session.text_content(page_number).await {
            Ok(runs) => matches.extend(scan_page(page_number, &runs, &needle, options)),
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "Skipping page in search");
                skipped_pages.push(page_number);
            }
        }
    }

    tracing::debug!(
        query,
        matches = matches.len(),
        skipped = skipped_pages.len(),
        "Search complete"
    );

    Ok(SearchOutcome::Searched {
        results: SearchResultSet::new(matches),
        skipped_pages,
    })
}

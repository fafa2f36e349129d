//! Search results
//!
//! Matches are derived data: fully recomputable from a query and the page
//! text, never persisted.

use serde::Serialize;

use crate::document::TextRun;

/// Navigation direction through a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn step(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// One occurrence of the query inside a text run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Position of the run within the page's text content
    pub run_index: usize,
    pub run: TextRun,
    /// Character offset of the first matched character
    pub start: usize,
    /// Character offset one past the last matched character
    pub end: usize,
}

impl SearchMatch {
    /// The matched slice of the run, in its original case
    pub fn matched_text(&self) -> String {
        self.run
            .text
            .chars()
            .skip(self.start)
            .take(self.end - self.start)
            .collect()
    }
}

/// Ordered matches plus a 1-based cursor (0 when empty)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultSet {
    matches: Vec<SearchMatch>,
    current_index: usize,
}

impl SearchResultSet {
    /// Build a result set; `matches` must already be in document order.
    /// The cursor starts on the first match.
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        let current_index = if matches.is_empty() { 0 } else { 1 };
        Self {
            matches,
            current_index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// The selected match, if any
    pub fn current(&self) -> Option<&SearchMatch> {
        self.current_index
            .checked_sub(1)
            .and_then(|i| self.matches.get(i))
    }

    /// Move the cursor one step, wrapping past either end
    pub fn advance(self, direction: Direction) -> Self {
        let len = self.matches.len() as i64;
        if len == 0 {
            return self;
        }
        let zero_based = self.current_index as i64 - 1 + direction.step();
        Self {
            current_index: (zero_based.rem_euclid(len) + 1) as usize,
            ..self
        }
    }

    /// Matches on a page, each flagged whether it is the selected one
    pub fn matches_on_page(&self, page_number: u32) -> impl Iterator<Item = (&SearchMatch, bool)> {
        let current = self.current_index;
        self.matches
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.page_number == page_number)
            .map(move |(i, m)| (m, i + 1 == current))
    }

    /// Toolbar counter, e.g. `2/5`; `None` when there is nothing to show
    pub fn counter_label(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(format!("{}/{}", self.current_index, self.len()))
        }
    }
}

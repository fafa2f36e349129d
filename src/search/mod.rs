//! In-document text search
//!
//! [`search`] scans every page's text runs for a case-insensitive query and
//! produces a [`SearchResultSet`]; navigation through the set is pure and
//! wraps around at both ends.

mod engine;
mod results;

pub use engine::{
    find_in_text, fold, normalize_query, scan_page, search, SearchOptions, SearchOutcome,
};
pub use results::{Direction, SearchMatch, SearchResultSet};

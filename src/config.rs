//! Configuration management for the viewer

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::document::DEFAULT_TEXT_CACHE_PAGES;
use crate::error::{Result, ViewerError};
use crate::search::SearchOptions;
use crate::view::{clamp_scale, PageLayout, Theme, DEFAULT_SCALE};

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Document to open on startup
    pub source_url: Option<String>,
    pub initial_scale: f32,
    pub theme: Theme,
    pub layout: PageLayout,
    /// Report overlapping occurrences of a query
    pub overlapping_matches: bool,
    /// Pages of text runs kept in the session cache
    pub text_cache_pages: usize,
    /// Where the binary writes page snapshots
    pub output_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            source_url: None,
            initial_scale: DEFAULT_SCALE,
            theme: Theme::Light,
            layout: PageLayout::Continuous,
            overlapping_matches: true,
            text_cache_pages: DEFAULT_TEXT_CACHE_PAGES,
            output_dir: PathBuf::from("./folio-output"),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ViewerConfig::default();

        Ok(ViewerConfig {
            source_url: lookup("FOLIO_SOURCE_URL").filter(|url| !url.trim().is_empty()),
            initial_scale: parse(&lookup, "FOLIO_INITIAL_SCALE")?
                .map(clamp_scale)
                .unwrap_or(defaults.initial_scale),
            theme: parse(&lookup, "FOLIO_THEME")?.unwrap_or(defaults.theme),
            layout: parse(&lookup, "FOLIO_LAYOUT")?.unwrap_or(defaults.layout),
            overlapping_matches: parse(&lookup, "FOLIO_OVERLAPPING_MATCHES")?
                .unwrap_or(defaults.overlapping_matches),
            text_cache_pages: parse(&lookup, "FOLIO_TEXT_CACHE_PAGES")?
                .unwrap_or(defaults.text_cache_pages),
            output_dir: lookup("FOLIO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            overlapping: self.overlapping_matches,
        }
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ViewerError::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}

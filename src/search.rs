//! Search history
//!
//! The last few free-text search terms, persisted under a single JSON key on
//! disk. Most recent first, de-duplicated on insert, capped in length. There
//! is no schema versioning.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// How many recent searches are kept.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Search history persistence errors.
#[derive(Debug, Error)]
pub enum SearchHistoryError {
    /// IO error reading or writing the history file
    #[error("failed to access search history: {0}")]
    Io(#[from] io::Error),

    /// The stored history was not a JSON list of strings
    #[error("failed to parse search history: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recent search terms, write-through persisted.
#[derive(Debug)]
pub struct RecentSearches {
    path: PathBuf,
    entries: Vec<String>,
}

impl RecentSearches {
    /// Load the history from disk; a missing file means an empty history.
    ///
    /// # Errors
    ///
    /// Returns a `SearchHistoryError` if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SearchHistoryError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, entries })
    }

    /// Record a search term.
    ///
    /// Blank terms and terms already in the history are skipped; otherwise
    /// the term goes to the front and the list is truncated to
    /// [`MAX_RECENT_SEARCHES`] before being written back.
    ///
    /// # Errors
    ///
    /// Returns a `SearchHistoryError` if the history cannot be written.
    pub fn record(&mut self, query: &str) -> Result<(), SearchHistoryError> {
        let query = query.trim();

        if query.is_empty() || self.entries.iter().any(|entry| entry == query) {
            return Ok(());
        }

        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);

        self.save()
    }

    /// The recorded terms, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Where the history is persisted.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), SearchHistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string(&self.entries)?)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_file_means_empty_history() -> TestResult {
        let dir = tempfile::tempdir()?;

        let searches = RecentSearches::load(dir.path().join("recent.json"))?;

        assert!(searches.entries().is_empty());

        Ok(())
    }

    #[test]
    fn terms_are_listed_most_recent_first() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut searches = RecentSearches::load(dir.path().join("recent.json"))?;

        searches.record("vase")?;
        searches.record("mug")?;

        assert_eq!(searches.entries(), ["mug", "vase"]);

        Ok(())
    }

    #[test]
    fn duplicates_and_blanks_are_skipped() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut searches = RecentSearches::load(dir.path().join("recent.json"))?;

        searches.record("vase")?;
        searches.record("vase")?;
        searches.record("   ")?;

        assert_eq!(searches.entries(), ["vase"]);

        Ok(())
    }

    #[test]
    fn history_is_capped() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut searches = RecentSearches::load(dir.path().join("recent.json"))?;

        for term in ["one", "two", "three", "four", "five", "six"] {
            searches.record(term)?;
        }

        assert_eq!(searches.entries().len(), MAX_RECENT_SEARCHES);
        assert_eq!(
            searches.entries().first().map(String::as_str),
            Some("six")
        );
        assert!(
            !searches.entries().iter().any(|entry| entry == "one"),
            "oldest entry should have been dropped"
        );

        Ok(())
    }

    #[test]
    fn history_survives_a_reload() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recent.json");

        let mut searches = RecentSearches::load(&path)?;

        searches.record("vase")?;
        searches.record("leather bag")?;

        let reloaded = RecentSearches::load(&path)?;

        assert_eq!(reloaded.entries(), ["leather bag", "vase"]);

        Ok(())
    }

    #[test]
    fn corrupt_history_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recent.json");

        fs::write(&path, "not json")?;

        let result = RecentSearches::load(&path);

        assert!(
            matches!(result, Err(SearchHistoryError::Json(_))),
            "expected a parse error"
        );

        Ok(())
    }
}

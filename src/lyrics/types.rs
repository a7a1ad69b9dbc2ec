//! Data structures and constants for AZLyrics scraping

use serde::ser::{Serialize, SerializeMap, Serializer};

// =============================================================================
// Constants
// =============================================================================

/// AZLyrics search endpoint
pub const SEARCH_ENDPOINT: &str = "https://search.azlyrics.com/search.php";

/// CSS selector for one search hit
pub const RESULT_SELECTOR: &str = ".visitedlyr";

/// Link inside a search hit; its `href` is the song page
pub const LINK_SELECTOR: &str = "a";

/// Bold element inside the link holding the song title
pub const TITLE_SELECTOR: &str = "b";

/// Positional path to the lyrics container on a song page
///
/// AZLyrics puts the lyrics in an unlabeled div, so there is no semantic selector.
/// Any layout change on the site breaks this silently.
pub const LYRICS_XPATH: &str = "/html/body/div[2]/div[2]/div[2]/div[5]";

/// Characters stripped from titles: backslash, straight and curly double quotes
const TITLE_STRIP_CHARS: [char; 4] = ['\\', '"', '\u{201C}', '\u{201D}'];

// =============================================================================
// Data Structures
// =============================================================================

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongResult {
    /// Song title with quotes and backslashes removed
    pub title: String,

    /// Absolute song page URL, `None` if the link had no `href`
    pub url: Option<String>,
}

/// Why a candidate element produced no entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `a` descendant
    MissingLink,
    /// No `b` descendant under the link, or it had no text
    MissingTitle,
    /// The browser failed while querying the candidate
    Lookup(String),
}

/// Result of extracting one candidate element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Extracted(SongResult),
    Skipped(SkipReason),
}

/// Title → URL mapping in insertion order
///
/// Inserting a title that is already present replaces its URL but keeps its
/// original position. Distinct songs sharing a title therefore collapse into
/// one entry carrying the later URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    entries: Vec<SongResult>,
}

impl SearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, song: SongResult) {
        match self.entries.iter_mut().find(|e| e.title == song.title) {
            Some(existing) => existing.url = song.url,
            None => self.entries.push(song),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.url.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongResult> {
        self.entries.iter()
    }

    /// URL of the first entry; `None` when empty or when that entry has no URL
    pub fn first_url(&self) -> Option<&str> {
        self.entries.first().and_then(|e| e.url.as_deref())
    }
}

impl FromIterator<SongResult> for SearchResults {
    fn from_iter<I: IntoIterator<Item = SongResult>>(iter: I) -> Self {
        let mut results = SearchResults::new();
        for song in iter {
            results.insert(song);
        }
        results
    }
}

impl Serialize for SearchResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.title, &entry.url)?;
        }
        map.end()
    }
}

/// Remove backslashes and double quotes (straight and curly) from a title
pub fn clean_title(raw: &str) -> String {
    raw.chars()
        .filter(|c| !TITLE_STRIP_CHARS.contains(c))
        .collect()
}

/// Put the lyrics on one line: every `\n` becomes a single space
pub fn collapse_newlines(text: &str) -> String {
    text.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, url: &str) -> SongResult {
        SongResult {
            title: title.to_string(),
            url: Some(url.to_string()),
        }
    }

    #[test]
    fn clean_title_strips_quotes_and_backslashes() {
        assert_eq!(clean_title(r#""Imagine""#), "Imagine");
        assert_eq!(clean_title("\u{201C}Yesterday\u{201D}"), "Yesterday");
        assert_eq!(clean_title(r"Don\'t Stop"), "Don't Stop");
        assert_eq!(clean_title("Plain"), "Plain");
    }

    #[test]
    fn collapse_newlines_joins_lines_with_spaces() {
        assert_eq!(collapse_newlines("Line one\nLine two"), "Line one Line two");
        assert_eq!(collapse_newlines("a\n\nb"), "a  b");
    }

    #[test]
    fn duplicate_title_overwrites_url_in_place() {
        let results: SearchResults = vec![
            song("Intro", "https://a/1"),
            song("Outro", "https://a/2"),
            song("Intro", "https://a/3"),
        ]
        .into_iter()
        .collect();

        assert_eq!(results.len(), 2);
        let titles: Vec<&str> = results.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Intro", "Outro"]);
        assert_eq!(results.get("Intro"), Some(Some("https://a/3")));
        assert_eq!(results.first_url(), Some("https://a/3"));
    }

    #[test]
    fn serializes_as_ordered_json_object() {
        let mut results = SearchResults::new();
        results.insert(song("Zebra", "https://a/z"));
        results.insert(SongResult {
            title: "Alpha".into(),
            url: None,
        });

        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(json, r#"{"Zebra":"https://a/z","Alpha":null}"#);
    }

    #[test]
    fn empty_results_have_no_first_url() {
        assert_eq!(SearchResults::new().first_url(), None);
        assert_eq!(serde_json::to_string(&SearchResults::new()).unwrap(), "{}");
    }
}

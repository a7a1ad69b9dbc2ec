//! AZLyrics scrape pipeline
//!
//! - `search` - submit a query and turn result elements into a title → URL map
//! - `extract` - pull the lyrics block off a song page
//! - `types` - result types, selectors and string cleanup
//!
//! Both steps run against any [`PageSession`](crate::dom::PageSession), so the
//! pipeline is exercised without a real browser in tests.

mod extract;
mod search;
mod types;

pub use extract::fetch_lyrics;
pub use search::{extract_candidate, extract_candidates, search, search_url};
pub use types::{
    CandidateOutcome, LINK_SELECTOR, LYRICS_XPATH, RESULT_SELECTOR, SEARCH_ENDPOINT,
    SearchResults, SkipReason, SongResult, TITLE_SELECTOR, clean_title, collapse_newlines,
};

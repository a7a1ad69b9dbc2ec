//! Lyrics extraction from a song page

use tracing::{info, warn};

use super::types::{LYRICS_XPATH, collapse_newlines};
use crate::browser::BrowserResult;
use crate::dom::{DomNode, PageSession};

/// Navigate to `song_url` and read the lyrics block as a single line
///
/// Returns `None` without navigating when `song_url` is absent or empty.
/// Every failure after that (navigation, missing node, missing text) is logged
/// and also yields `None`.
pub async fn fetch_lyrics<S: PageSession>(session: &S, song_url: Option<&str>) -> Option<String> {
    let url = song_url.filter(|url| !url.is_empty())?;

    match read_lyrics(session, url).await {
        Ok(Some(text)) => Some(collapse_newlines(&text)),
        Ok(None) => {
            warn!("Error obtaining lyrics: no lyrics node at {} on {}", LYRICS_XPATH, url);
            None
        }
        Err(e) => {
            warn!("Error obtaining lyrics: {}", e);
            None
        }
    }
}

async fn read_lyrics<S: PageSession>(session: &S, url: &str) -> BrowserResult<Option<String>> {
    info!("Fetching lyrics from {}", url);
    session.navigate(url).await?;

    match session.find_one(LYRICS_XPATH).await? {
        Some(node) => node.text().await,
        None => Ok(None),
    }
}

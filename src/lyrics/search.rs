//! Search execution and result extraction

use tracing::{debug, info};

use super::types::{
    CandidateOutcome, LINK_SELECTOR, RESULT_SELECTOR, SearchResults, SkipReason, SongResult,
    TITLE_SELECTOR, clean_title,
};
use crate::SiteConfig;
use crate::browser::BrowserResult;
use crate::dom::{DomNode, PageSession};

/// Build the search URL for `song_name`
///
/// Both values are percent-encoded; spaces become `%20`. The key is an opaque
/// token defined by the site and normally contains only unreserved characters.
pub fn search_url(endpoint: &str, query_key: &str, song_name: &str) -> String {
    format!(
        "{}?q={}&x={}",
        endpoint,
        urlencoding::encode(song_name),
        urlencoding::encode(query_key)
    )
}

/// Search the site and collect title → URL pairs in page order
///
/// With `limit`, only the first `limit` result elements are examined; elements
/// that fail extraction are skipped, so fewer entries may come back.
///
/// # Errors
/// Navigation failures and failures to query the result list propagate.
/// Problems with individual results never do.
pub async fn search<S: PageSession>(
    session: &S,
    site: &SiteConfig,
    query_key: &str,
    song_name: &str,
    limit: Option<usize>,
) -> BrowserResult<SearchResults> {
    let url = search_url(&site.search_endpoint, query_key, song_name);
    info!("Searching: {}", url);

    session.navigate(&url).await?;

    let mut candidates = session.find_all(RESULT_SELECTOR).await?;
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    let results: SearchResults = extract_candidates(&candidates)
        .await
        .into_iter()
        .filter_map(|outcome| match outcome {
            CandidateOutcome::Extracted(song) => Some(song),
            CandidateOutcome::Skipped(reason) => {
                debug!("Skipped search result: {:?}", reason);
                None
            }
        })
        .collect();

    info!("Search for '{}' returned {} result(s)", song_name, results.len());
    Ok(results)
}

/// Extract every candidate, one outcome per element, in input order
pub async fn extract_candidates<N: DomNode>(candidates: &[N]) -> Vec<CandidateOutcome> {
    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        outcomes.push(extract_candidate(candidate).await);
    }
    outcomes
}

/// Pull the title from `a b` and the URL from the `a` of one result element
pub async fn extract_candidate<N: DomNode>(candidate: &N) -> CandidateOutcome {
    match try_extract(candidate).await {
        Ok(outcome) => outcome,
        Err(e) => CandidateOutcome::Skipped(SkipReason::Lookup(e.to_string())),
    }
}

async fn try_extract<N: DomNode>(candidate: &N) -> BrowserResult<CandidateOutcome> {
    let Some(link) = candidate.find_child(LINK_SELECTOR).await? else {
        return Ok(CandidateOutcome::Skipped(SkipReason::MissingLink));
    };
    let Some(bold) = link.find_child(TITLE_SELECTOR).await? else {
        return Ok(CandidateOutcome::Skipped(SkipReason::MissingTitle));
    };
    let Some(raw_title) = bold.text().await? else {
        return Ok(CandidateOutcome::Skipped(SkipReason::MissingTitle));
    };

    Ok(CandidateOutcome::Extracted(SongResult {
        title: clean_title(&raw_title),
        url: link.href().await?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_spaces() {
        assert_eq!(
            search_url(super::super::SEARCH_ENDPOINT, "abc123", "bohemian rhapsody"),
            "https://search.azlyrics.com/search.php?q=bohemian%20rhapsody&x=abc123"
        );
    }

    #[test]
    fn search_url_escapes_query_separators() {
        let url = search_url("https://example.test/s", "k", "rock & roll");
        assert_eq!(url, "https://example.test/s?q=rock%20%26%20roll&x=k");
    }
}

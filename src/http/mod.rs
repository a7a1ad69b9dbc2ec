//! HTTP surface
//!
//! Every handler owns one browser session for the length of the request:
//! acquire, run the pipeline, release, then answer. The release happens on the
//! error path too, before the error is turned into a response.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::SiteConfig;
use crate::browser::BrowserError;
use crate::dom::{PageSession, SessionFactory};
use crate::lyrics::{self, SearchResults};

/// Shared, read-only handler state
pub struct AppState<F> {
    pub factory: Arc<F>,
    pub site: Arc<SiteConfig>,
}

impl<F> AppState<F> {
    pub fn new(factory: F, site: SiteConfig) -> Self {
        Self {
            factory: Arc::new(factory),
            site: Arc::new(site),
        }
    }
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            site: Arc::clone(&self.site),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to start browser session: {0}")]
    Session(#[source] BrowserError),

    #[error("Search failed: {0}")]
    Search(#[source] BrowserError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub fn build_router<F: SessionFactory>(state: AppState<F>) -> Router {
    Router::new()
        .route("/songs/{key}/{song_name}", get(list_songs::<F>))
        .route("/song/{key}/{song_name}", get(get_song::<F>))
        .route("/getLyrics/{key}/{song_name}", get(get_lyrics::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn acquire<F: SessionFactory>(state: &AppState<F>) -> Result<F::Session, ApiError> {
    state.factory.acquire().await.map_err(ApiError::Session)
}

/// `GET /songs/{key}/{song_name}` - every match
async fn list_songs<F: SessionFactory>(
    State(state): State<AppState<F>>,
    Path((key, song_name)): Path<(String, String)>,
) -> Result<Json<SearchResults>, ApiError> {
    info!("Received request for key: {} and song_name: {}", key, song_name);

    let session = acquire(&state).await?;
    let result = lyrics::search(&session, &state.site, &key, &song_name, None).await;
    session.release().await;

    result.map(Json).map_err(ApiError::Search)
}

/// `GET /song/{key}/{song_name}` - the first match only
async fn get_song<F: SessionFactory>(
    State(state): State<AppState<F>>,
    Path((key, song_name)): Path<(String, String)>,
) -> Result<Json<SearchResults>, ApiError> {
    info!("Received request for key: {} and song_name: {}", key, song_name);

    let session = acquire(&state).await?;
    let result = lyrics::search(&session, &state.site, &key, &song_name, Some(1)).await;
    session.release().await;

    result.map(Json).map_err(ApiError::Search)
}

/// `GET /getLyrics/{key}/{song_name}` - lyrics of the first match, or `null`
///
/// No match at all is handled like a match without URL and answers `null`.
async fn get_lyrics<F: SessionFactory>(
    State(state): State<AppState<F>>,
    Path((key, song_name)): Path<(String, String)>,
) -> Result<Json<Option<String>>, ApiError> {
    info!("Received request for key: {} and song_name: {}", key, song_name);

    let session = acquire(&state).await?;
    let result = match lyrics::search(&session, &state.site, &key, &song_name, Some(1)).await {
        Ok(songs) => Ok(lyrics::fetch_lyrics(&session, songs.first_url()).await),
        Err(e) => Err(ApiError::Search(e)),
    };
    session.release().await;

    result.map(Json)
}

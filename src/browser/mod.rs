//! Chrome sessions for scraping
//!
//! Every acquired session is a separate Chrome process with its own profile
//! directory. Nothing is pooled or shared between requests.

mod session;

pub use session::{ChromeSession, ChromeSessionFactory};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timed out after {0}ms")]
    Timeout(u128),

    #[error("DOM query failed: {0}")]
    Dom(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

//! Browser capabilities the scrape pipeline depends on
//!
//! The search and lyrics extractors only ever navigate, query the DOM and read
//! text or links. Keeping that surface behind these traits lets the pipeline run
//! against chromiumoxide in production and against an in-memory page in tests.

use async_trait::async_trait;

use crate::browser::BrowserError;

/// A node of the loaded document
#[async_trait]
pub trait DomNode: Send + Sync + Sized {
    /// First descendant matching a CSS selector, in document order
    async fn find_child(&self, selector: &str) -> Result<Option<Self>, BrowserError>;

    /// Visible (rendered) text of the node
    async fn text(&self) -> Result<Option<String>, BrowserError>;

    /// Resolved `href` of a link, `None` when the element has no `href` attribute
    async fn href(&self) -> Result<Option<String>, BrowserError>;
}

/// One exclusive browser session with a single page
#[async_trait]
pub trait PageSession: Send + Sync + Sized {
    type Node: DomNode;

    /// Load `url` and wait for the navigation to settle
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Node>, BrowserError>;

    /// The element at an absolute XPath, if present
    async fn find_one(&self, xpath: &str) -> Result<Option<Self::Node>, BrowserError>;

    /// Tear the session down. Must be called exactly once per acquired session.
    async fn release(self);
}

/// Produces a brand-new session per call; sessions are never reused.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: PageSession + 'static;

    async fn acquire(&self) -> Result<Self::Session, BrowserError>;
}

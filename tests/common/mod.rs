#![allow(dead_code)]

//! In-memory browser used by the integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lyricscrape::lyrics::{LYRICS_XPATH, RESULT_SELECTOR};
use lyricscrape::{BrowserError, DomNode, PageSession, SessionFactory};

/// Element with a tag, optional text/href and children
#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    pub tag: String,
    pub text: Option<String>,
    pub href: Option<String>,
    pub children: Vec<FakeNode>,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn child(mut self, child: FakeNode) -> Self {
        self.children.push(child);
        self
    }

    fn descendant(&self, tag: &str) -> Option<&FakeNode> {
        for child in &self.children {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.descendant(tag) {
                return Some(found);
            }
        }
        None
    }
}

#[async_trait]
impl DomNode for FakeNode {
    async fn find_child(&self, selector: &str) -> Result<Option<Self>, BrowserError> {
        Ok(self.descendant(selector).cloned())
    }

    async fn text(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.text.clone())
    }

    async fn href(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.href.clone())
    }
}

/// `<td class="visitedlyr"><a href=url><b>title</b></a></td>`
pub fn search_hit(title: &str, url: &str) -> FakeNode {
    FakeNode::new("td").child(
        FakeNode::new("a")
            .with_href(url)
            .child(FakeNode::new("b").with_text(title)),
    )
}

/// What the fake browser shows for URLs starting with a prefix
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    /// Elements returned for the search result selector
    pub results: Vec<FakeNode>,
    /// Node returned for the lyrics XPath
    pub lyrics: Option<FakeNode>,
}

impl FakeDocument {
    pub fn search(results: Vec<FakeNode>) -> Self {
        Self {
            results,
            lyrics: None,
        }
    }

    pub fn lyrics(text: &str) -> Self {
        Self {
            results: Vec::new(),
            lyrics: Some(FakeNode::new("div").with_text(text)),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeSession {
    routes: Vec<(String, FakeDocument)>,
    current: Mutex<Option<FakeDocument>>,
    pub visited: Arc<Mutex<Vec<String>>>,
    released: Option<Arc<AtomicUsize>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for every URL starting with `prefix`
    pub fn route(mut self, prefix: &str, document: FakeDocument) -> Self {
        self.routes.push((prefix.to_string(), document));
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSession for FakeSession {
    type Node = FakeNode;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.visited.lock().unwrap().push(url.to_string());

        let document = self
            .routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, doc)| doc.clone())
            .ok_or_else(|| BrowserError::NavigationFailed(format!("{url}: net::ERR_NAME_NOT_RESOLVED")))?;

        *self.current.lock().unwrap() = Some(document);
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeNode>, BrowserError> {
        let current = self.current.lock().unwrap();
        match current.as_ref() {
            Some(doc) if selector == RESULT_SELECTOR => Ok(doc.results.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn find_one(&self, xpath: &str) -> Result<Option<FakeNode>, BrowserError> {
        let current = self.current.lock().unwrap();
        match current.as_ref() {
            Some(doc) if xpath == LYRICS_XPATH => Ok(doc.lyrics.clone()),
            _ => Ok(None),
        }
    }

    async fn release(self) {
        if let Some(counter) = &self.released {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Hands out sessions serving the same routes, counting acquire/release
#[derive(Debug, Default)]
pub struct FakeFactory {
    routes: Vec<(String, FakeDocument)>,
    fail_acquire: bool,
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    pub visited: Arc<Mutex<Vec<String>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, document: FakeDocument) -> Self {
        self.routes.push((prefix.to_string(), document));
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_acquire: true,
            ..Default::default()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn acquire(&self) -> Result<FakeSession, BrowserError> {
        if self.fail_acquire {
            return Err(BrowserError::LaunchFailed(
                "Chrome/Chromium executable not found".into(),
            ));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            routes: self.routes.clone(),
            current: Mutex::new(None),
            visited: Arc::clone(&self.visited),
            released: Some(Arc::clone(&self.released)),
        })
    }
}

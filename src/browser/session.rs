//! chromiumoxide-backed scraping session
//!
//! Wraps one Chrome process, its CDP event handler task and a single page.

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserResult};
use crate::BrowserConfig;
use crate::browser_setup::{launch_browser, remove_profile_dir, resolve_executable};
use crate::dom::{DomNode, PageSession, SessionFactory};

/// Launches one fresh Chrome per `acquire()`
///
/// The executable is resolved on first use and cached, so discovery and any
/// managed download run once per factory. Concurrent first acquires wait on
/// the same resolution.
#[derive(Debug, Clone)]
pub struct ChromeSessionFactory {
    config: BrowserConfig,
    executable: Arc<OnceCell<PathBuf>>,
}

impl ChromeSessionFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            executable: Arc::new(OnceCell::new()),
        }
    }

    /// Resolved Chrome executable, cached after the first success
    pub async fn executable(&self) -> BrowserResult<PathBuf> {
        self.executable
            .get_or_try_init(|| resolve_executable(self.config.executable.as_deref()))
            .await
            .cloned()
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    async fn acquire(&self) -> BrowserResult<ChromeSession> {
        let chrome_path = self.executable().await?;

        // Unique profile per session; concurrent requests would otherwise fight over the lock
        let user_data_dir =
            std::env::temp_dir().join(format!("lyricscrape_chrome_{}", uuid::Uuid::new_v4()));

        let (browser, handler) = launch_browser(&self.config, chrome_path, user_data_dir.clone())
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

        let mut session = ChromeSession {
            browser,
            handler,
            page: None,
            user_data_dir: Some(user_data_dir),
            navigation_timeout: Duration::from_secs(self.config.navigation_timeout_secs),
        };

        match session.browser.new_page("about:blank").await {
            Ok(page) => {
                session.page = Some(page);
                Ok(session)
            }
            Err(e) => {
                session.release().await;
                Err(BrowserError::PageCreationFailed(e.to_string()))
            }
        }
    }
}

/// One exclusive browser process driving a single page
///
/// `release()` closes Chrome, waits for the process to exit and removes the
/// profile directory. Dropping without `release()` still aborts the handler
/// task and kills the child, but leaves the profile directory behind.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    user_data_dir: Option<PathBuf>,
    navigation_timeout: Duration,
}

impl ChromeSession {
    fn page(&self) -> BrowserResult<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::PageCreationFailed("No page open".into()))
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();

        if let Some(path) = &self.user_data_dir {
            warn!(
                "ChromeSession dropped without release(). Temp directory will be orphaned: {}",
                path.display()
            );
        }
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    type Node = Element;

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let page = self.page()?;

        tokio::time::timeout(self.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout(self.navigation_timeout.as_millis()))?
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        Ok(())
    }

    async fn find_all(&self, selector: &str) -> BrowserResult<Vec<Element>> {
        self.page()?
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::Dom(format!("'{selector}': {e}")))
    }

    async fn find_one(&self, xpath: &str) -> BrowserResult<Option<Element>> {
        let nodes = self
            .page()?
            .find_xpaths(xpath)
            .await
            .map_err(|e| BrowserError::Dom(format!("'{xpath}': {e}")))?;
        Ok(nodes.into_iter().next())
    }

    async fn release(mut self) {
        info!("Shutting down browser session");

        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            debug!("Failed to close page: {}", e);
        }

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }

        // Wait for the process to exit before touching its profile directory
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }

        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up profile dir: {}", path.display());
            remove_profile_dir(&path).await;
        }
    }
}

#[async_trait]
impl DomNode for Element {
    async fn find_child(&self, selector: &str) -> BrowserResult<Option<Element>> {
        let children = self
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::Dom(format!("'{selector}': {e}")))?;
        Ok(children.into_iter().next())
    }

    async fn text(&self) -> BrowserResult<Option<String>> {
        self.inner_text()
            .await
            .map_err(|e| BrowserError::Dom(e.to_string()))
    }

    async fn href(&self) -> BrowserResult<Option<String>> {
        let raw = self
            .attribute("href")
            .await
            .map_err(|e| BrowserError::Dom(e.to_string()))?;
        if raw.is_none() {
            return Ok(None);
        }

        // The DOM property is the absolute URL; the attribute may be relative
        let resolved = self
            .property("href")
            .await
            .map_err(|e| BrowserError::Dom(e.to_string()))?;
        match resolved {
            Some(serde_json::Value::String(url)) if !url.is_empty() => Ok(Some(url)),
            _ => Ok(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory_for(executable: PathBuf) -> ChromeSessionFactory {
        ChromeSessionFactory::new(BrowserConfig {
            executable: Some(executable),
            ..BrowserConfig::default()
        })
    }

    #[tokio::test]
    async fn executable_is_resolved_once_and_cached() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let factory = factory_for(path.clone());

        assert_eq!(factory.executable().await.unwrap(), path);

        // A second lookup must not re-check the filesystem
        drop(file);
        assert!(!path.exists());
        assert_eq!(factory.executable().await.unwrap(), path);
        assert_eq!(factory.clone().executable().await.unwrap(), path);
    }

    #[tokio::test]
    async fn concurrent_first_lookups_share_one_result() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let factory = factory_for(file.path().to_path_buf());

        let (a, b) = tokio::join!(factory.executable(), factory.executable());
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[tokio::test]
    async fn acquire_with_missing_executable_is_not_found() {
        let factory = factory_for(PathBuf::from("/nonexistent/chrome"));

        let err = factory.acquire().await.err().unwrap();
        assert!(matches!(err, BrowserError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn failed_resolution_is_retried() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("chrome");
        let factory = factory_for(path.clone());

        assert!(factory.executable().await.is_err());
        std::fs::write(&path, b"").unwrap();
        assert_eq!(factory.executable().await.unwrap(), path);
    }
}

//! Chrome executable resolution and launch
//!
//! Resolution is done once per [`ChromeSessionFactory`](crate::ChromeSessionFactory);
//! launching happens for every session.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult};

/// Commands tried with `which` after the well-known install locations
const WHICH_COMMANDS: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Well-known install locations for the current platform
fn install_locations() -> Vec<PathBuf> {
    let fixed: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    let mut locations: Vec<PathBuf> = fixed.iter().map(PathBuf::from).collect();
    if cfg!(target_os = "macos")
        && let Some(home) = dirs::home_dir()
    {
        locations.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
        locations.push(home.join("Applications/Chromium.app/Contents/MacOS/Chromium"));
    }
    locations
}

fn which(command: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(command).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Look for an installed Chrome/Chromium (blocking: stats files, runs `which`)
///
/// Order: `CHROMIUM_PATH`, install locations, `which`.
pub fn discover_executable() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Some(path);
        }
        warn!("CHROMIUM_PATH points to non-existent file: {}", path.display());
    }

    if let Some(path) = install_locations().into_iter().find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Some(path);
    }

    if cfg!(target_os = "windows") {
        return None;
    }
    let path = WHICH_COMMANDS.iter().find_map(|cmd| which(cmd))?;
    info!("Found browser using 'which': {}", path.display());
    Some(path)
}

/// Download a managed Chromium build into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::env::temp_dir().join(".cache"))
        .join("lyricscrape/chromium");
    info!("Downloading managed Chromium into {}", cache_dir.display());

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Resolve the Chrome executable: explicit path, discovery, then download
///
/// Every failure is `BrowserError::NotFound`. Callers are expected to run this
/// once and reuse the result; see `ChromeSessionFactory::executable`.
pub async fn resolve_executable(explicit: Option<&Path>) -> BrowserResult<PathBuf> {
    if let Some(path) = explicit {
        return match tokio::fs::try_exists(path).await {
            Ok(true) => Ok(path.to_path_buf()),
            _ => Err(BrowserError::NotFound(format!(
                "configured executable does not exist: {}",
                path.display()
            ))),
        };
    }

    let discovered = task::spawn_blocking(discover_executable)
        .await
        .map_err(|e| BrowserError::NotFound(format!("executable discovery panicked: {e}")))?;
    if let Some(path) = discovered {
        return Ok(path);
    }

    warn!("No Chrome/Chromium executable found, falling back to download");
    download_managed_browser()
        .await
        .map_err(|e| BrowserError::NotFound(format!("no local browser and download failed: {e:#}")))
}

/// Removes the profile directory on drop unless the launch succeeded
struct ProfileDirGuard {
    path: PathBuf,
    armed: bool,
}

impl ProfileDirGuard {
    async fn create(path: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&path)
            .await
            .context("Failed to create user data directory")?;
        Ok(Self { path, armed: true })
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProfileDirGuard {
    fn drop(&mut self) {
        // Only reached on a failed launch; Drop cannot await
        if self.armed && let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!("Failed to clean up profile dir {}: {}", self.path.display(), e);
        }
    }
}

/// Remove a session's profile directory once Chrome has exited
pub async fn remove_profile_dir(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        warn!(
            "Failed to clean up profile dir {}: {}. Manual cleanup may be required.",
            path.display(),
            e
        );
    }
}

/// Launch a headless Chromium with the fixed scraping flag set.
///
/// The flags are not tunable per call: headless, sandbox disabled and
/// `/dev/shm` usage disabled, so the browser starts inside minimal containers.
/// `user_data_dir` must be unique per launch; it is created here and removed
/// again if the launch fails.
pub async fn launch_browser(
    config: &BrowserConfig,
    chrome_path: PathBuf,
    user_data_dir: PathBuf,
) -> Result<(Browser, JoinHandle<()>)> {
    let profile = ProfileDirGuard::create(user_data_dir).await?;

    let browser_config = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(config.request_timeout_secs))
        .window_size(config.window.width, config.window.height)
        .user_data_dir(profile.path.clone())
        .chrome_executable(chrome_path)
        .headless_mode(HeadlessMode::default())
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching browser with config: {:?}", browser_config);
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let error_msg = e.to_string();

                // Chrome emits CDP events chromiumoxide cannot deserialize; these are harmless.
                // See https://github.com/mattsse/chromiumoxide/issues/167
                let is_benign_serialization_error = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");

                if is_benign_serialization_error {
                    trace!("Suppressed benign CDP serialization error: {}", error_msg);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        info!("Browser handler task completed");
    });

    // The session now owns the directory
    profile.disarm();

    Ok((browser, handler_task))
}

//! Lyrics search and scraping over HTTP
//!
//! Drives a headless Chromium through chromiumoxide to search AZLyrics and read
//! lyrics from song pages. Each request gets its own browser process.

pub mod browser;
pub mod browser_setup;
pub mod cli;
pub mod dom;
pub mod http;
pub mod lyrics;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

/// Listen address for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Browser launch configuration
///
/// Headless mode and the sandbox flags are fixed and not part of this config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Explicit Chrome/Chromium path; discovery and download are skipped when set
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Timeout for individual CDP requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for a single page load
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Target site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_search_endpoint() -> String {
    lyrics::SEARCH_ENDPOINT.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            request_timeout_secs: default_request_timeout_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_endpoint: default_search_endpoint(),
        }
    }
}

/// Locate the config file
///
/// An explicit path wins. Otherwise `./lyricscrape.yaml`, then
/// `<config dir>/lyricscrape/config.yaml`.
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    search_config_file(explicit, Path::new("."), dirs::config_dir().as_deref())
}

fn search_config_file(
    explicit: Option<&Path>,
    working_dir: &Path,
    config_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = working_dir.join("lyricscrape.yaml");
    if local.exists() {
        return Some(local);
    }

    config_dir
        .map(|dir| dir.join("lyricscrape").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load YAML config from `path`, or defaults when no path is given
pub fn load_yaml_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub use browser::{BrowserError, BrowserResult, ChromeSession, ChromeSessionFactory};
pub use dom::{DomNode, PageSession, SessionFactory};
pub use http::{AppState, build_router};
pub use lyrics::{SearchResults, SongResult, fetch_lyrics, search};

//! Headless-browser page scraping.
//!
//! Loads a page in an isolated headless Chrome instance, waits for the DOM
//! to finish loading (not necessarily all asynchronous content), extracts
//! the rendered body markup, and strips tags with a simple pattern match.
//! Entities and malformed markup may leak through; the chunker and the
//! embedding model tolerate that noise.

use crate::error::{PaddockError, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use regex::Regex;
use std::ffi::OsStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for page scraping.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetch a page's rendered content as plain text.
    async fn scrape(&self, url: &str) -> Result<String>;
}

/// Scraper backed by a headless Chrome instance.
///
/// Each scrape launches its own browser and drops it unconditionally after
/// extraction, so a crashed page cannot leak a browser into the next URL.
pub struct HeadlessScraper {
    navigation_timeout: Duration,
}

impl HeadlessScraper {
    /// Create a scraper with the given navigation timeout.
    pub fn new(navigation_timeout: Duration) -> Self {
        Self { navigation_timeout }
    }

    fn scrape_blocking(url: &str, timeout: Duration) -> Result<String> {
        let args: Vec<&OsStr> = ["--no-sandbox", "--disable-gpu", "--disable-dev-shm-usage"]
            .iter()
            .map(OsStr::new)
            .collect();

        let launch_options = LaunchOptions {
            headless: true,
            args,
            ..Default::default()
        };

        // The browser is dropped at the end of this scope regardless of
        // outcome, which kills the Chrome process.
        let browser = Browser::new(launch_options)
            .map_err(|e| PaddockError::Scrape(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| PaddockError::Scrape(format!("Failed to open tab: {}", e)))?;
        tab.set_default_timeout(timeout);

        tab.navigate_to(url)
            .map_err(|e| PaddockError::Scrape(format!("Failed to navigate to {}: {}", url, e)))?;
        tab.wait_until_navigated().map_err(|e| {
            PaddockError::Scrape(format!("Navigation to {} did not complete: {}", url, e))
        })?;

        let result = tab
            .evaluate("document.body.innerHTML", false)
            .map_err(|e| PaddockError::Scrape(format!("Failed to extract markup: {}", e)))?;

        let html = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(strip_tags(&html))
    }
}

impl Default for HeadlessScraper {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl Scraper for HeadlessScraper {
    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> Result<String> {
        // Validate early so an unparseable URL fails before a browser launch.
        url::Url::parse(url)
            .map_err(|e| PaddockError::InvalidInput(format!("Invalid URL {}: {}", url, e)))?;

        let url = url.to_string();
        let timeout = self.navigation_timeout;

        let text = tokio::task::spawn_blocking(move || Self::scrape_blocking(&url, timeout))
            .await
            .map_err(|e| PaddockError::Scrape(format!("Scrape task panicked: {}", e)))??;

        debug!("Scraped {} characters of text", text.chars().count());
        Ok(text)
    }
}

/// Strip all markup tags from HTML, leaving plain text.
///
/// A deliberate pattern match, not a full HTML parser.
pub fn strip_tags(html: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    re.replace_all(html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_markup() {
        let html = "<div><h1>Fórmula 1</h1><p>Temporada de <b>2025</b>.</p></div>";
        assert_eq!(strip_tags(html), "Fórmula 1Temporada de 2025.");
    }

    #[test]
    fn strips_tags_with_attributes_across_lines() {
        let html = "<a\n  href=\"https://example.com\"\n>link</a> text";
        assert_eq!(strip_tags(html), "link text");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(strip_tags("sem marcação"), "sem marcação");
        assert_eq!(strip_tags(""), "");
    }

    #[tokio::test]
    async fn rejects_invalid_urls_before_launching() {
        let scraper = HeadlessScraper::default();
        let result = scraper.scrape("not a url").await;
        assert!(matches!(result, Err(PaddockError::InvalidInput(_))));
    }
}

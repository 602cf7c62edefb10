//! Browser automation boundary
//!
//! The multi-quality resolver drives a page through this trait only. Element
//! handles never cross the boundary; every query is expressed as a
//! [`Locator`] and evaluated against the current page.

use crate::BrowserError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// How to find elements on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// Innermost elements whose normalised text starts with the given label
    /// (case-insensitive)
    Text(String),
    /// Elements matching `css` whose text contains `text` (case-insensitive)
    HasText { css: String, text: String },
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Self::Css(selector.to_string())
    }

    pub fn text(label: &str) -> Self {
        Self::Text(label.to_string())
    }

    pub fn has_text(css: &str, text: &str) -> Self {
        Self::HasText {
            css: css.to_string(),
            text: text.to_string(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{}", css),
            Self::Text(text) => write!(f, "text={}", text),
            Self::HasText { css, text } => write!(f, "{}:has-text('{}')", css, text),
        }
    }
}

/// Click behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickOptions {
    /// Skip visibility checks
    pub force: bool,
    /// Give up after this long
    pub timeout: Option<Duration>,
}

/// One exclusively owned browser page
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates and waits for the load to finish
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Waits until the page has gone quiet
    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError>;

    /// URL of the current page, after any redirects
    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Number of elements matching `locator`
    async fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError>;

    /// Attribute of the first match; `None` when absent
    async fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Rendered text of the first match
    async fn inner_text(&mut self, locator: &Locator) -> Result<String, BrowserError>;

    /// Clicks the first match
    async fn click(&mut self, locator: &Locator, options: ClickOptions)
        -> Result<(), BrowserError>;

    /// Resolved `href` of every anchor on the page
    async fn list_hrefs(&mut self) -> Result<Vec<String>, BrowserError>;

    /// Releases the page and its browser
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Starts a fresh browser session per resolution attempt
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

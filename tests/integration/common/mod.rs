//! Shared fixtures for the integration tests
//!
//! `MockSite` is a scripted in-memory browser: a map of URL → page, where a
//! page is a flat list of elements. Clicking an element with `on_click`
//! navigates to that URL.

#![allow(dead_code)]

use async_trait::async_trait;
use egydead_dl::config::{Config, TimingConfig};
use egydead_dl::resolver::{BrowserLauncher, BrowserSession, ClickOptions, Locator};
use egydead_dl::BrowserError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Configuration pointed at a mock server, with every pacing delay removed
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.download_referer = None;
    config.timing = TimingConfig::immediate();
    config
}

#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub tag: String,
    pub classes: Vec<String>,
    pub text: String,
    pub href: Option<String>,
    pub on_click: Option<String>,
}

impl MockElement {
    pub fn link(text: &str, href: &str) -> Self {
        Self {
            tag: "a".to_string(),
            text: text.to_string(),
            href: Some(href.to_string()),
            ..Self::default()
        }
    }

    pub fn button(text: &str) -> Self {
        Self {
            tag: "button".to_string(),
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn div(class: &str) -> Self {
        Self {
            tag: "div".to_string(),
            classes: vec![class.to_string()],
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn on_click(mut self, url: &str) -> Self {
        self.on_click = Some(url.to_string());
        self
    }

    fn matches_css(&self, css: &str) -> bool {
        let mut parts = css.split('.');
        let tag = parts.next().unwrap_or("");
        if !tag.is_empty() && tag != self.tag {
            return false;
        }
        parts.all(|class| self.classes.iter().any(|c| c == class))
    }

    fn normalized_text(&self) -> String {
        self.text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Css(css) => self.matches_css(css),
            Locator::Text(label) => self.normalized_text().starts_with(&label.to_lowercase()),
            Locator::HasText { css, text } => {
                self.matches_css(css) && self.normalized_text().contains(&text.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub elements: Vec<MockElement>,
    /// Where the browser ends up after loading this page
    pub redirect_to: Option<String>,
}

impl MockPage {
    pub fn new(elements: Vec<MockElement>) -> Self {
        Self {
            elements,
            redirect_to: None,
        }
    }

    pub fn redirect(url: &str) -> Self {
        Self {
            elements: Vec::new(),
            redirect_to: Some(url.to_string()),
        }
    }
}

/// A set of pages plus counters shared by every session launched over it
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    pages: Arc<HashMap<String, MockPage>>,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
    fail_launch: bool,
}

impl MockSite {
    pub fn new(pages: Vec<(&str, MockPage)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn launcher(&self) -> Arc<dyn BrowserLauncher> {
        Arc::new(self.clone())
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for MockSite {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("no browser in tests".to_string()));
        }

        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            site: self.clone(),
            current: None,
        }))
    }
}

pub struct MockSession {
    site: MockSite,
    current: Option<String>,
}

impl MockSession {
    fn page(&self) -> Option<&MockPage> {
        self.current
            .as_ref()
            .and_then(|url| self.site.pages.get(url))
    }

    fn first(&self, locator: &Locator) -> Result<MockElement, BrowserError> {
        self.page()
            .and_then(|page| page.elements.iter().find(|e| e.matches(locator)))
            .cloned()
            .ok_or_else(|| BrowserError::NotFound(locator.to_string()))
    }

    fn go(&mut self, url: &str) -> Result<(), BrowserError> {
        self.site.visited.lock().unwrap().push(url.to_string());

        let page = self
            .site
            .pages
            .get(url)
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: "404".to_string(),
            })?;

        self.current = Some(page.redirect_to.clone().unwrap_or_else(|| url.to_string()));
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.go(url)
    }

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.current.clone().unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError> {
        Ok(self
            .page()
            .map(|page| page.elements.iter().filter(|e| e.matches(locator)).count())
            .unwrap_or(0))
    }

    async fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let element = self.first(locator)?;
        Ok(match name {
            "href" => element.href,
            "class" => Some(element.classes.join(" ")),
            _ => None,
        })
    }

    async fn inner_text(&mut self, locator: &Locator) -> Result<String, BrowserError> {
        Ok(self.first(locator)?.text)
    }

    async fn click(
        &mut self,
        locator: &Locator,
        _options: ClickOptions,
    ) -> Result<(), BrowserError> {
        let element = self.first(locator)?;
        match element.on_click {
            Some(target) => self.go(&target),
            None => Ok(()),
        }
    }

    async fn list_hrefs(&mut self) -> Result<Vec<String>, BrowserError> {
        Ok(self
            .page()
            .map(|page| page.elements.iter().filter_map(|e| e.href.clone()).collect())
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.site.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

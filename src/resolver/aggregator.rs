//! Multi-quality aggregator resolver
//!
//! Walks the aggregator's redirector in a browser:
//!
//! | Stage | Action |
//! |-------|--------|
//! | Landing | Open the redirect URL, wait for idle, note the final URL |
//! | Discovery | Look for the known quality labels; else click a reveal button and retry once; else construct candidate URLs |
//! | Probing | Visit every option and look for a download trigger, reading its size |
//! | Selection | Keep active options; fall back to the original page; auto-select or prompt |
//! | Extraction | Force-click the trigger, wait, scan anchors for a media link |
//!
//! Any failure in any stage makes the whole attempt unresolved. The browser
//! session is closed on every exit path.

use crate::config::{Config, TimingConfig};
use crate::extract::Extractor;
use crate::prompt::Prompter;
use crate::resolver::browser::{BrowserLauncher, BrowserSession, ClickOptions, Locator};
use crate::resolver::heuristic::MediaHeuristic;
use crate::resolver::quality::{select_quality, size_extractor, QualityOption, QUALITY_TIERS};
use crate::resolver::ResolvedMedia;
use crate::{DlError, ExtractError};
use std::fmt;
use std::sync::Arc;

/// Stages of one aggregator walk, used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Landing,
    Discovery,
    Reveal,
    Construct,
    Probing,
    Selection,
    Extraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Origin and file id of the page the constructed URLs were derived from
#[derive(Debug, Clone)]
struct ConstructedBase {
    origin: String,
    file_id: String,
}

impl ConstructedBase {
    fn from_page_url(page_url: &str) -> Option<Self> {
        let file_id = last_path_segment(page_url)?;
        Some(Self {
            origin: page_origin(page_url),
            file_id,
        })
    }

    fn candidates(&self) -> Vec<QualityOption> {
        [
            ("Full HD (Constructed)", "_h"),
            ("HD (Constructed)", "_n"),
            ("Original/Default (Constructed)", ""),
        ]
        .iter()
        .map(|(name, suffix)| {
            QualityOption::new(
                *name,
                format!("{}/f/{}{}", self.origin, self.file_id, suffix),
            )
        })
        .collect()
    }

    fn original_url(&self) -> String {
        format!("{}/{}", self.origin, self.file_id)
    }
}

/// Browser-driven resolver for the multi-quality aggregator
pub struct AggregatorResolver {
    launcher: Arc<dyn BrowserLauncher>,
    timing: TimingConfig,
    heuristic: MediaHeuristic,
    size: Extractor,
}

impl AggregatorResolver {
    pub fn new(
        config: &Config,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            launcher,
            timing: config.timing.clone(),
            heuristic: MediaHeuristic::new(&config.media),
            size: size_extractor()?,
        })
    }

    /// Resolves an aggregator redirect URL to a direct media URL
    ///
    /// `preference` is matched case-insensitively against quality names;
    /// when it does not decide, `prompter` is asked for a 1-based index.
    pub async fn resolve(
        &self,
        url: &str,
        preference: Option<&str>,
        prompter: &mut dyn Prompter,
    ) -> Option<ResolvedMedia> {
        tracing::info!("Resolving Multi Download: {}", url);

        let mut session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Could not start browser: {}", e);
                return None;
            }
        };

        let outcome = self
            .walk(session.as_mut(), url, preference, prompter)
            .await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        match outcome {
            Ok(Some(media)) => Some(media),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Error in browser resolution: {}", e);
                None
            }
        }
    }

    async fn walk(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
        preference: Option<&str>,
        prompter: &mut dyn Prompter,
    ) -> Result<Option<ResolvedMedia>, DlError> {
        tracing::debug!("[{}] Navigating to initial URL", Stage::Landing);
        session.navigate(url, self.timing.landing_timeout()).await?;
        session.wait_for_network_idle().await?;
        let landing_url = session.current_url().await?;
        tracing::info!("Redirected to: {}", landing_url);

        let mut constructed = None;
        let mut options = self.discover_qualities(session).await?;

        if options.is_empty() {
            tracing::info!("Could not detect quality options automatically");
            if self.reveal(session).await? {
                options = self.discover_qualities(session).await?;
            }
        }

        if options.is_empty() {
            let page_url = session.current_url().await?;
            if let Some(base) = ConstructedBase::from_page_url(&page_url) {
                tracing::info!(
                    "[{}] Attempting to use constructed quality URLs",
                    Stage::Construct
                );
                options = base.candidates();
                constructed = Some(base);
            }
        }

        tracing::info!("[{}] Fetching file sizes for quality options", Stage::Probing);
        for option in options.iter_mut() {
            tracing::debug!("Checking {}...", option.name);
            match self.probe(session, &option.url).await {
                Ok(Some(text)) => {
                    let size = self
                        .size
                        .extract_value(&text)
                        .unwrap_or_else(|| "Unknown Size".to_string());
                    option.mark_active(size);
                }
                Ok(None) => option.mark_inactive("Button not found"),
                Err(e) => {
                    tracing::warn!("Error checking {}: {}", option.name, e);
                    option.mark_inactive("Error");
                }
            }
        }

        let mut active: Vec<QualityOption> = options
            .into_iter()
            .filter(|option| option.has_active_button)
            .collect();

        if active.is_empty() {
            tracing::info!("No valid download buttons found on quality pages");
            if let Some(base) = &constructed {
                let original_url = base.original_url();
                tracing::info!("Checking original page: {}", original_url);
                match self.probe(session, &original_url).await {
                    Ok(Some(_)) => {
                        let mut direct = QualityOption::new("Single Quality / Direct", original_url);
                        direct.mark_active("Unknown");
                        active.push(direct);
                    }
                    Ok(None) => tracing::debug!("No trigger on original page"),
                    Err(e) => tracing::warn!("Fallback failed: {}", e),
                }
            }
        }

        if active.is_empty() {
            return Ok(None);
        }

        let index = select_quality(&active, preference, prompter)?;
        let selected = &active[index];
        tracing::info!(
            "[{}] Selected: {} ({})",
            Stage::Selection,
            selected.name,
            selected.size_display()
        );

        self.extract_final_link(session, selected).await
    }

    /// Reads the known quality labels off the current page
    async fn discover_qualities(
        &self,
        session: &mut dyn BrowserSession,
    ) -> Result<Vec<QualityOption>, DlError> {
        let page_url = session.current_url().await?;
        let origin = page_origin(&page_url);
        let mut found = Vec::new();

        for tier in QUALITY_TIERS.iter() {
            let locator = Locator::text(tier.label);
            if session.count(&locator).await? == 0 {
                continue;
            }

            if let Some(href) = session.attribute(&locator, "href").await? {
                let href = href.trim();
                if href.is_empty() {
                    continue;
                }
                tracing::debug!("[{}] Found {}", Stage::Discovery, tier.name);
                found.push(QualityOption::new(tier.name, absolutize(&origin, href)));
            }
        }

        Ok(found)
    }

    /// Clicks a generic download/reveal button if there is one
    ///
    /// Returns whether a button was found. A failed click is logged and does
    /// not abort the walk.
    async fn reveal(&self, session: &mut dyn BrowserSession) -> Result<bool, DlError> {
        let candidates = [
            Locator::text("Download File"),
            Locator::text("Create Download Link"),
            Locator::has_text("button", "Download"),
        ];

        let button = match first_present(session, &candidates).await? {
            Some(button) => button,
            None => {
                tracing::info!("No initial download button found");
                return Ok(false);
            }
        };

        let label = session.inner_text(&button).await.unwrap_or_default();
        tracing::info!("[{}] Found download button: {}. Clicking...", Stage::Reveal, label.trim());

        let click = ClickOptions {
            force: false,
            timeout: Some(self.timing.click_timeout()),
        };
        let clicked = match session.click(&button, click).await {
            Ok(()) => session.wait_for_network_idle().await,
            Err(e) => Err(e),
        };
        if let Err(e) = clicked {
            tracing::info!("Click failed or timed out: {}", e);
        }

        Ok(true)
    }

    /// Opens `url` and returns the trigger's text if a trigger is present
    async fn probe(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
    ) -> Result<Option<String>, DlError> {
        session.navigate(url, self.timing.probe_timeout()).await?;
        session.wait_for_network_idle().await?;

        match first_present(session, &trigger_locators()).await? {
            Some(trigger) => Ok(Some(session.inner_text(&trigger).await.unwrap_or_default())),
            None => Ok(None),
        }
    }

    /// Opens the selected option, fires its trigger and scans for the media link
    async fn extract_final_link(
        &self,
        session: &mut dyn BrowserSession,
        selected: &QualityOption,
    ) -> Result<Option<ResolvedMedia>, DlError> {
        if session.current_url().await? != selected.url {
            session.navigate(&selected.url, self.timing.probe_timeout()).await?;
            session.wait_for_network_idle().await?;
        }

        let trigger = match first_present(session, &trigger_locators()).await? {
            Some(trigger) => trigger,
            None => {
                tracing::info!("No download trigger on {}", selected.url);
                return Ok(None);
            }
        };

        tracing::info!("[{}] Found download trigger button. Clicking...", Stage::Extraction);
        session
            .click(
                &trigger,
                ClickOptions {
                    force: true,
                    timeout: None,
                },
            )
            .await?;

        tracing::info!("Waiting for final link...");
        tokio::time::sleep(self.timing.link_wait()).await;

        let hrefs = session.list_hrefs().await?;
        Ok(self
            .heuristic
            .first_match(&hrefs)
            .map(|url| ResolvedMedia::new(url, selected.name.clone())))
    }
}

/// Download-trigger alternatives, in priority order
fn trigger_locators() -> [Locator; 4] {
    [
        Locator::css(".g-recaptcha"),
        Locator::has_text("a.btn-primary", "Download"),
        Locator::has_text("button", "Download"),
        Locator::has_text("a", "Download"),
    ]
}

/// First locator with at least one match on the current page
async fn first_present(
    session: &mut dyn BrowserSession,
    candidates: &[Locator],
) -> Result<Option<Locator>, DlError> {
    for candidate in candidates {
        if session.count(candidate).await? > 0 {
            return Ok(Some(candidate.clone()));
        }
    }
    Ok(None)
}

/// `scheme://host[:port]` of a URL
fn page_origin(url: &str) -> String {
    url.splitn(4, '/').take(3).collect::<Vec<_>>().join("/")
}

/// Makes a possibly relative href absolute against an origin
fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", origin, href)
    }
}

/// Last non-empty path segment, ignoring query and fragment
fn last_path_segment(url: &str) -> Option<String> {
    let without_query = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    let path = without_query.splitn(4, '/').nth(3).unwrap_or("");
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for egydead-dl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub timing: TimingConfig,
    pub hosts: HostsConfig,
    pub media: MediaConfig,
    pub output: OutputConfig,
    pub browser: BrowserConfig,
}

/// Catalog site settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Root URL of the catalog site
    pub base_url: String,

    /// Path appended to the base URL before the encoded query
    pub search_path: String,

    /// Browser-identifying User-Agent sent with every request
    pub user_agent: String,

    /// Referer sent when streaming a resolved file to disk
    pub download_referer: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://egydead.skin".to_string(),
            search_path: "/?s=".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            download_referer: Some("https://haxloppd.com/".to_string()),
        }
    }
}

impl SiteConfig {
    /// Full search URL prefix, e.g. `https://egydead.skin/?s=`
    pub fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_path
        )
    }
}

/// Fixed waits and timeouts (milliseconds unless noted)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimingConfig {
    /// Pause before re-submitting an interstitial challenge form
    pub challenge_delay_ms: u64,

    /// Pause after clicking the final download trigger
    pub link_wait_ms: u64,

    /// Navigation timeout for the aggregator landing page
    pub landing_timeout_ms: u64,

    /// Navigation timeout while probing quality pages
    pub probe_timeout_ms: u64,

    /// Timeout for the reveal-button click
    pub click_timeout_ms: u64,

    /// Quiet period treated as "network idle" after a navigation
    pub idle_settle_ms: u64,

    /// Whole-request timeout for the HTTP client (seconds)
    pub request_timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            challenge_delay_ms: 2_000,
            link_wait_ms: 10_000,
            landing_timeout_ms: 60_000,
            probe_timeout_ms: 30_000,
            click_timeout_ms: 5_000,
            idle_settle_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl TimingConfig {
    pub fn challenge_delay(&self) -> Duration {
        Duration::from_millis(self.challenge_delay_ms)
    }

    pub fn link_wait(&self) -> Duration {
        Duration::from_millis(self.link_wait_ms)
    }

    pub fn landing_timeout(&self) -> Duration {
        Duration::from_millis(self.landing_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms)
    }

    pub fn idle_settle(&self) -> Duration {
        Duration::from_millis(self.idle_settle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// All pacing delays set to zero, for tests against mock servers
    pub fn immediate() -> Self {
        Self {
            challenge_delay_ms: 0,
            link_wait_ms: 0,
            idle_settle_ms: 0,
            ..Self::default()
        }
    }
}

/// Markers used to tell mirror host families apart
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HostsConfig {
    /// Substrings of a redirect URL that identify the lightweight redirect host
    pub lightweight_markers: Vec<String>,

    /// Server name of the multi-quality aggregator mirror
    pub aggregator_server_marker: String,

    /// Looser server-name hints accepted when the exact marker is absent
    pub loose_server_markers: Vec<String>,

    /// Substrings of a redirect URL that identify the aggregator directly
    pub aggregator_url_markers: Vec<String>,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            lightweight_markers: vec!["dood".to_string(), "dsvplay".to_string()],
            aggregator_server_marker: "تحميل متعدد".to_string(),
            loose_server_markers: vec!["تحميل".to_string(), "Multi".to_string()],
            aggregator_url_markers: Vec::new(),
        }
    }
}

/// Heuristic deciding whether a URL points at an actual media file
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MediaConfig {
    /// File extension markers, e.g. ".mp4"
    pub extensions: Vec<String>,

    /// CDN host substrings
    pub cdn_markers: Vec<String>,

    /// URLs longer than this are taken to be signed links
    pub min_signed_length: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            extensions: vec![".mp4".to_string()],
            cdn_markers: vec!["premilkyway".to_string(), "cdn".to_string()],
            min_signed_length: 100,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory for downloaded files
    pub download_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: "downloaded".to_string(),
        }
    }
}

/// Headless browser settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// How long the browser connection may sit unused, e.g. while the user
    /// is choosing a quality
    pub idle_timeout_secs: u64,
}

impl BrowserConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            idle_timeout_secs: 3600,
        }
    }
}

//! Host resolvers
//!
//! A mirror's redirect URL is never a playable file. It is classified into a
//! closed set of [`HostKind`]s and handed to exactly one strategy:
//! - [`DoodResolver`]: plain HTTP redirect chain with an optional challenge form
//! - [`AggregatorResolver`]: browser-driven walk over a multi-quality redirector
//!
//! Both strategies swallow remote failures and report `None` ("unresolved").

mod aggregator;
mod browser;
mod chrome;
mod doodstream;
mod heuristic;
pub(crate) mod host;
mod quality;

pub use aggregator::AggregatorResolver;
pub use browser::{BrowserLauncher, BrowserSession, ClickOptions, Locator};
pub use chrome::{ChromeLauncher, ChromeSession};
pub use doodstream::DoodResolver;
pub use heuristic::MediaHeuristic;
pub use host::{classify_host, HostKind};
pub use quality::{
    auto_select, select_quality, size_extractor, QualityOption, QualityTier, QUALITY_TIERS,
};

/// A direct media URL produced by a resolver
///
/// Only resolvers construct this, and only from a URL that passed a
/// media-shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    final_url: String,
    quality_name: String,
}

impl ResolvedMedia {
    pub(crate) fn new(final_url: impl Into<String>, quality_name: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            quality_name: quality_name.into(),
        }
    }

    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    pub fn quality_name(&self) -> &str {
        &self.quality_name
    }
}

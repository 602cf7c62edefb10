//! Lightweight redirect-chain resolver
//!
//! Protocol, strictly sequential:
//! 1. GET the redirect URL
//! 2. Follow the `/download/` anchor (normalised against the redirect URL)
//! 3. GET the download page with the redirect URL as referer
//! 4. If a challenge form is present and complete, wait and POST it back
//! 5. Extract the final link ("Download file" anchor, else a token/expiry link)
//!
//! Any failure yields `None`; nothing is propagated to the caller.

use crate::catalog::DownloadLink;
use crate::config::Config;
use crate::extract::{Extractor, RegexPattern};
use crate::http::{FetchRequest, Fetcher};
use crate::resolver::ResolvedMedia;
use crate::{ExtractError, FetchError};
use url::Url;

/// Hidden fields of the challenge form, in submission order
const CHALLENGE_FIELDS: [&str; 4] = ["op", "id", "mode", "hash"];

/// Resolver for the lightweight redirect host family
pub struct DoodResolver {
    config: Config,
    download_page: Extractor,
    challenge_form: Extractor,
    challenge_fields: Vec<(&'static str, Extractor)>,
    final_link: Extractor,
}

impl DoodResolver {
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let challenge_fields = CHALLENGE_FIELDS
            .iter()
            .map(|&field| hidden_field_extractor(field).map(|extractor| (field, extractor)))
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self {
            config: config.clone(),
            download_page: Extractor::regex("download-page", r#"href="([^"]*/download/[^"]*)""#)?,
            challenge_form: Extractor::regex(
                "challenge-form",
                r#"(?i)(<form[^>]*\bname=["']?F1["']?)"#,
            )?,
            challenge_fields,
            final_link: Extractor::regex(
                "download-file-anchor",
                r#"<a[^>]*href="([^"]+)"[^>]*>\s*Download file\s*</a>"#,
            )?
            .or(RegexPattern::new(
                "token-expiry-link",
                r#"href="([^"]+token=[^"]+expiry=[^"]+)""#,
            )?),
        })
    }

    /// Resolves a mirror link; the quality name is the mirror's own label
    pub async fn resolve(&self, link: &DownloadLink) -> Option<ResolvedMedia> {
        self.resolve_url(&link.redirect_url)
            .await
            .map(|url| ResolvedMedia::new(url, link.quality_label.clone()))
    }

    /// Resolves a redirect URL to the final file URL
    pub async fn resolve_url(&self, url: &str) -> Option<String> {
        // One cookie-carrying session per attempt
        let fetcher = match Fetcher::from_config(&self.config, true) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                tracing::warn!("Failed to build HTTP client: {}", e);
                return None;
            }
        };

        match self.try_resolve(&fetcher, url).await {
            Ok(Some(final_url)) => {
                tracing::info!("Resolved {} -> {}", url, final_url);
                Some(final_url)
            }
            Ok(None) => {
                tracing::debug!("No direct link found behind {}", url);
                None
            }
            Err(e) => {
                tracing::debug!("Error resolving {}: {}", url, e);
                None
            }
        }
    }

    async fn try_resolve(&self, fetcher: &Fetcher, url: &str) -> Result<Option<String>, FetchError> {
        let landing = fetcher.get(url).await?;

        let href = match self.download_page.extract_value(&landing.body) {
            Some(href) => href,
            None => return Ok(None),
        };
        let download_url = normalize_href(url, &href)?;

        let page = fetcher
            .fetch(FetchRequest::get(&download_url).with_referer(url))
            .await?;
        let mut body = page.body;

        if self.challenge_form.extract_first(&body).is_some() {
            match self.challenge_values(&body) {
                Some(form) => {
                    tracing::debug!("Submitting challenge form on {}", download_url);
                    tokio::time::sleep(self.config.timing.challenge_delay()).await;
                    let response = fetcher
                        .fetch(
                            FetchRequest::post_form(&download_url, form)
                                .with_referer(&download_url),
                        )
                        .await?;
                    body = response.body;
                }
                None => tracing::debug!("Challenge form incomplete, using page as-is"),
            }
        }

        Ok(self.final_link.extract_value(&body))
    }

    /// Reads all four hidden challenge fields; `None` if any is missing
    fn challenge_values(&self, html: &str) -> Option<Vec<(String, String)>> {
        self.challenge_fields
            .iter()
            .map(|(name, extractor)| {
                extractor
                    .extract_value(html)
                    .map(|value| (name.to_string(), value))
            })
            .collect()
    }
}

/// `name=... value=...` in either attribute order
fn hidden_field_extractor(field: &str) -> Result<Extractor, ExtractError> {
    Ok(Extractor::regex(
        &format!("field-{}", field),
        &format!(r#"name="{}"[^>]*?value="([^"]*)""#, field),
    )?
    .or(RegexPattern::new(
        &format!("field-{}-reversed", field),
        &format!(r#"value="([^"]*)"[^>]*?name="{}""#, field),
    )?))
}

/// Resolves a protocol- or root-relative href against the page it came from
fn normalize_href(base: &str, href: &str) -> Result<String, FetchError> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Ok(href.to_string());
    }

    let base_url = Url::parse(base).map_err(|source| FetchError::InvalidUrl {
        url: base.to_string(),
        source,
    })?;
    base_url
        .join(href)
        .map(|url| url.to_string())
        .map_err(|source| FetchError::InvalidUrl {
            url: href.to_string(),
            source,
        })
}

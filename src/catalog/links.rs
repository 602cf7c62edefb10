//! Mirror link extraction for content pages

use crate::catalog::models::DownloadLink;
use crate::extract::{Extractor, RegexPattern};
use crate::http::{FetchRequest, Fetcher};
use crate::ExtractError;
use std::collections::HashSet;

/// Pulls the (server, quality, redirect URL) triples offered on a content page
pub struct LinkExtractor {
    fetcher: Fetcher,
    mirrors: Extractor,
}

impl LinkExtractor {
    pub fn new(fetcher: Fetcher) -> Result<Self, ExtractError> {
        let mirrors = Extractor::regex(
            "mirror",
            r#"(?s)<span class="ser-name">(.*?)</span>.*?<em>(.*?)</em>.*?href="(.*?)""#,
        )?
        .or(RegexPattern::new(
            "mirror-loose",
            r#"(?s)<span[^>]*class=["'][^"']*ser-name[^"']*["'][^>]*>(.*?)</span>.*?<em[^>]*>(.*?)</em>.*?href=["']([^"']*)["']"#,
        )?);

        Ok(Self { fetcher, mirrors })
    }

    /// Returns the mirror links of a movie or episode page
    ///
    /// The page only lists its mirrors in response to a `View=1` form POST.
    /// Transport errors are logged and produce an empty list.
    pub async fn get_download_links(&self, content_url: &str) -> Vec<DownloadLink> {
        let request = FetchRequest::post_form(
            content_url,
            vec![("View".to_string(), "1".to_string())],
        );

        match self.fetcher.fetch(request).await {
            Ok(page) => {
                let links = self.parse_download_links(&page.body);
                tracing::debug!("Found {} mirror link(s) on {}", links.len(), content_url);
                links
            }
            Err(e) => {
                tracing::warn!("Error fetching movie page: {}", e);
                Vec::new()
            }
        }
    }

    /// Extracts mirror links in document order, dropping `javascript:` placeholders
    ///
    /// A redirect URL listed more than once is kept at its first position.
    pub fn parse_download_links(&self, html: &str) -> Vec<DownloadLink> {
        let mut seen = HashSet::new();
        self.mirrors
            .extract(html)
            .into_iter()
            .filter_map(|record| match record.as_slice() {
                [server, quality, url] => {
                    let url = url.trim();
                    if url.is_empty() || url.starts_with("javascript") {
                        return None;
                    }
                    Some(DownloadLink {
                        server_name: server.trim().to_string(),
                        quality_label: quality.trim().to_string(),
                        redirect_url: url.to_string(),
                    })
                }
                _ => None,
            })
            .filter(|link| seen.insert(link.redirect_url.clone()))
            .collect()
    }
}

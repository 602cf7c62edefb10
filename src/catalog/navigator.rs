//! Catalog hierarchy navigation
//!
//! Listing pages are read with layered patterns: a selector-based pattern
//! first, a looser regex as fallback. Transport failures never propagate;
//! they are logged and produce an empty listing.

use crate::catalog::models::{
    sort_by_episode_number, CatalogEntry, HierarchyNode, NodeKind,
};
use crate::config::Config;
use crate::extract::{dedup_preserving_order, Extractor, Field, RegexPattern, SelectorPattern};
use crate::http::Fetcher;
use crate::ExtractError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in search queries
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Walks search results, series, seasons and collections
pub struct Navigator {
    fetcher: Fetcher,
    search_url: String,
    listing: Extractor,
    seasons: Extractor,
    episodes: Extractor,
    collection: Extractor,
    alt_title: Extractor,
}

impl Navigator {
    /// Creates a navigator for the configured site
    pub fn new(config: &Config, fetcher: Fetcher) -> Result<Self, ExtractError> {
        let listing = Extractor::new(vec![Box::new(SelectorPattern::new(
            "listing-item",
            "li.movieItem",
            vec![
                Field::attr(Some("a[href]"), "href")?,
                Field::text(Some("h1.BottomTitle"))?,
            ],
        )?)])
        .or(RegexPattern::new(
            "listing-item-regex",
            r#"(?s)<li class="movieItem">.*?<a href="([^"]*)".*?<h1 class="BottomTitle">(.*?)</h1>"#,
        )?);

        let collection = Extractor::regex(
            "collection-item",
            r#"<li class="movieItem">\s*<a href="([^"]+)" title="([^"]+)""#,
        )?
        .or(RegexPattern::new(
            "collection-block-item",
            r#"(?s)<a href="([^"]+)"[^>]*class="[^"]*BlockItem[^"]*"[^>]*>(.*?)</a>"#,
        )?);

        Ok(Self {
            fetcher,
            search_url: config.site.search_url(),
            listing,
            seasons: child_link_extractor("season")?,
            episodes: child_link_extractor("episode")?,
            collection,
            alt_title: Extractor::regex("alt-title", r#"alt="([^"]+)""#)?,
        })
    }

    /// Builds the search URL for a query
    pub fn search_url_for(&self, query: &str) -> String {
        format!(
            "{}{}",
            self.search_url,
            utf8_percent_encode(query, QUERY_SAFE)
        )
    }

    /// Searches the catalog and returns listing items in page order
    pub async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        tracing::info!("Searching for: {}", query);
        let url = self.search_url_for(query);

        match self.fetcher.get(&url).await {
            Ok(page) => self.parse_search_results(&page.body),
            Err(e) => {
                tracing::warn!("Error during search: {}", e);
                Vec::new()
            }
        }
    }

    /// Extracts search listing items from a results page
    pub fn parse_search_results(&self, html: &str) -> Vec<CatalogEntry> {
        self.listing
            .extract(html)
            .into_iter()
            .filter_map(|record| match record.as_slice() {
                [url, title] if !url.is_empty() && !title.is_empty() => Some(CatalogEntry {
                    title: title.trim().to_string(),
                    url: url.trim().to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Lists the seasons linked from a series page
    pub async fn list_seasons(&self, series_url: &str) -> Vec<HierarchyNode> {
        self.list_children(series_url, NodeKind::Season).await
    }

    /// Lists the episodes linked from a season page
    pub async fn list_episodes(&self, season_url: &str) -> Vec<HierarchyNode> {
        self.list_children(season_url, NodeKind::Downloadable).await
    }

    /// Lists episodes of a series page ordered by episode number
    ///
    /// Bare `/episode/` index links are dropped.
    pub async fn list_series_episodes(&self, series_url: &str) -> Vec<HierarchyNode> {
        let mut nodes: Vec<HierarchyNode> = self
            .list_episodes(series_url)
            .await
            .into_iter()
            .filter(|node| !node.url.ends_with("/episode/"))
            .collect();
        sort_by_episode_number(&mut nodes);
        nodes
    }

    async fn list_children(&self, url: &str, kind: NodeKind) -> Vec<HierarchyNode> {
        match self.fetcher.get(url).await {
            Ok(page) => self.parse_child_links(&page.body, kind),
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", url, e);
                Vec::new()
            }
        }
    }

    /// Extracts deduplicated season or episode links in first-seen order
    pub fn parse_child_links(&self, html: &str, kind: NodeKind) -> Vec<HierarchyNode> {
        let extractor = match kind {
            NodeKind::Season => &self.seasons,
            _ => &self.episodes,
        };

        let urls = extractor
            .extract(html)
            .into_iter()
            .filter_map(|record| record.into_iter().next());

        dedup_preserving_order(urls)
            .into_iter()
            .map(|url| HierarchyNode::new(url, kind))
            .collect()
    }

    /// Lists the movies of a collection page
    ///
    /// An empty result means the page is a single movie.
    pub async fn list_collection(&self, url: &str) -> Vec<CatalogEntry> {
        match self.fetcher.get(url).await {
            Ok(page) => self.parse_collection(&page.body),
            Err(e) => {
                tracing::warn!("Error fetching content details for {}: {}", url, e);
                Vec::new()
            }
        }
    }

    /// Extracts collection sub-items, skipping episode links
    pub fn parse_collection(&self, html: &str) -> Vec<CatalogEntry> {
        self.collection
            .extract(html)
            .into_iter()
            .filter_map(|record| {
                let mut fields = record.into_iter();
                let url = fields.next()?;
                let title_or_html = fields.next().unwrap_or_default();

                if url.contains("Episode") || url.contains("/episode/") {
                    return None;
                }

                let title = if title_or_html.contains('<') {
                    self.alt_title
                        .extract_value(&title_or_html)
                        .unwrap_or_else(|| "Unknown Title".to_string())
                } else {
                    title_or_html.trim().to_string()
                };

                Some(CatalogEntry { title, url })
            })
            .collect()
    }
}

fn child_link_extractor(segment: &str) -> Result<Extractor, ExtractError> {
    Ok(Extractor::regex(
        &format!("{}-link", segment),
        &format!(r#"href="([^"]*/{}/[^"]*)""#, segment),
    )?
    .or(RegexPattern::new(
        &format!("{}-link-single-quoted", segment),
        &format!(r#"href='([^']*/{}/[^']*)'"#, segment),
    )?))
}

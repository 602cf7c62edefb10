use percent_encoding::percent_decode_str;
use std::fmt;

/// A search result or collection sub-item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub url: String,
}

/// Position of a URL in the site hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A series page listing seasons
    Series,
    /// A season page listing episodes
    Season,
    /// A movie or episode page offering download links
    Downloadable,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Series => "series",
            Self::Season => "season",
            Self::Downloadable => "downloadable",
        };
        write!(f, "{}", name)
    }
}

/// A series, season or episode reference found on a parent page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub url: String,
    pub display_name: String,
    pub kind: NodeKind,
}

impl HierarchyNode {
    pub fn new(url: String, kind: NodeKind) -> Self {
        let display_name = display_name(&url);
        Self {
            url,
            display_name,
            kind,
        }
    }
}

/// One mirror offering for a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub server_name: String,
    pub quality_label: String,
    pub redirect_url: String,
}

/// Classifies a catalog URL by path segment
///
/// # Examples
///
/// ```
/// use egydead_dl::catalog::{classify, NodeKind};
///
/// assert_eq!(classify("https://egydead.skin/serie/foo/"), NodeKind::Series);
/// assert_eq!(classify("https://egydead.skin/season/foo-1/"), NodeKind::Season);
/// assert_eq!(classify("https://egydead.skin/episode/foo-1/"), NodeKind::Downloadable);
/// ```
pub fn classify(url: &str) -> NodeKind {
    if url.contains("/serie/") {
        NodeKind::Series
    } else if url.contains("/season/") {
        NodeKind::Season
    } else {
        NodeKind::Downloadable
    }
}

/// Derives a human label from the last non-empty path segment of a URL
///
/// The segment is percent-decoded and dashes become spaces.
pub fn display_name(url: &str) -> String {
    let segment = url
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(url)
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("");

    percent_decode_str(segment)
        .decode_utf8_lossy()
        .replace('-', " ")
}

/// Parses the `episode-<n>` number out of an episode URL
pub fn episode_number(url: &str) -> Option<u32> {
    let start = url.find("episode-")? + "episode-".len();
    let digits: String = url[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Orders nodes by episode number; unnumbered nodes sort first, ties keep listing order
pub fn sort_by_episode_number(nodes: &mut [HierarchyNode]) {
    nodes.sort_by_key(|node| episode_number(&node.url).unwrap_or(0));
}

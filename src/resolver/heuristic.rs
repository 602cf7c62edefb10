use crate::config::MediaConfig;

/// Decides whether a link looks like an actual media file
///
/// A link qualifies when it contains one of the extension markers and either
/// a CDN marker or more than `min_signed_length` characters (signed links are
/// long).
#[derive(Debug, Clone)]
pub struct MediaHeuristic {
    extensions: Vec<String>,
    cdn_markers: Vec<String>,
    min_signed_length: usize,
}

impl MediaHeuristic {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            cdn_markers: config.cdn_markers.clone(),
            min_signed_length: config.min_signed_length,
        }
    }

    pub fn looks_like_media(&self, url: &str) -> bool {
        let has_extension = self.extensions.iter().any(|ext| url.contains(ext.as_str()));
        if !has_extension {
            return false;
        }

        self.cdn_markers.iter().any(|marker| url.contains(marker.as_str()))
            || url.len() > self.min_signed_length
    }

    /// First link in `hrefs` that looks like media
    pub fn first_match<'a>(&self, hrefs: &'a [String]) -> Option<&'a str> {
        hrefs
            .iter()
            .map(String::as_str)
            .find(|href| self.looks_like_media(href))
    }
}

impl Default for MediaHeuristic {
    fn default() -> Self {
        Self::new(&MediaConfig::default())
    }
}

//! Pipeline orchestration
//!
//! Ties navigation, mirror extraction and host resolution together:
//! - `lookup`: search or open a URL, list seasons/episodes/mirrors and
//!   resolve lightweight mirrors inline
//! - `fetch`: pick content, choose a mirror (aggregator first), resolve it
//!   and either report the direct link or download the file

mod orchestrator;
mod persist;
mod selection;

pub use orchestrator::{FetchOptions, LookupOutcome, MirrorReport, Pipeline};
pub use persist::{download_file, folder_for_query, safe_file_name};
pub use selection::EpisodeSelection;

use crate::resolver::ResolvedMedia;
use std::fmt;
use std::path::PathBuf;

/// What kind of content the user is after
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    Movie,
    Series,
}

/// What to do with a resolved link
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Action {
    /// Stream the file to disk
    Download,
    /// Only print the direct link
    Link,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// Result of processing one movie or episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Direct link reported to the user
    Linked(ResolvedMedia),
    /// File written to disk
    Downloaded { media: ResolvedMedia, path: PathBuf },
    /// Link resolved but writing the file failed
    DownloadFailed(ResolvedMedia),
    /// A resolver ran and found nothing
    Unresolved,
    /// The content page offered no mirrors
    NoLinks,
    /// The user declined every mirror
    Skipped,
}

impl ItemOutcome {
    /// The resolved media, if resolution succeeded
    pub fn media(&self) -> Option<&ResolvedMedia> {
        match self {
            Self::Linked(media) | Self::DownloadFailed(media) => Some(media),
            Self::Downloaded { media, .. } => Some(media),
            _ => None,
        }
    }
}

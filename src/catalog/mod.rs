//! Catalog site navigation
//!
//! This module walks the site's content hierarchy:
//! - Search result listings
//! - Series pages (lists of seasons)
//! - Season pages (lists of episodes)
//! - Collection pages (lists of related movies)
//! - Content pages (lists of mirror download links)

mod links;
mod models;
mod navigator;

pub use links::LinkExtractor;
pub use models::{
    classify, display_name, episode_number, sort_by_episode_number, CatalogEntry, DownloadLink,
    HierarchyNode, NodeKind,
};
pub use navigator::Navigator;

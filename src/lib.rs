//! egydead-dl: link resolution for a streaming catalog site
//!
//! This crate walks the catalog hierarchy (search results, series, seasons,
//! episodes), collects the mirror links offered for a title and unwraps the
//! third-party host chains behind them into a direct media URL.

pub mod catalog;
pub mod config;
pub mod extract;
pub mod http;
pub mod pipeline;
pub mod prompt;
pub mod resolver;

use thiserror::Error;

/// Main error type for egydead-dl operations
#[derive(Debug, Error)]
pub enum DlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Pattern error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },
}

/// Errors raised while building extraction patterns
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid regex pattern '{name}': {source}")]
    Regex { name: String, source: regex::Error },

    #[error("Invalid selector in pattern '{name}': {selector}")]
    Selector { name: String, selector: String },
}

/// Browser automation failures
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("No element matches {0}")]
    NotFound(String),

    #[error("Browser automation failed: {0}")]
    Automation(String),
}

/// Interactive input failures
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Input stream closed")]
    Closed,

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for egydead-dl operations
pub type Result<T> = std::result::Result<T, DlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{CatalogEntry, DownloadLink, HierarchyNode, NodeKind};
pub use config::Config;
pub use pipeline::{Action, FetchOptions, ItemOutcome, LookupOutcome, Mode, Pipeline};
pub use prompt::{Prompter, StdinPrompter};
pub use resolver::{HostKind, QualityOption, ResolvedMedia};

//! Configuration module for egydead-dl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the defaults the tool
//! has always shipped with.
//!
//! # Example
//!
//! ```no_run
//! use egydead_dl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("egydead.toml")).unwrap();
//! println!("Searching on: {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, HostsConfig, MediaConfig, OutputConfig, SiteConfig, TimingConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};

//! HTTP transport for catalog pages and mirror hosts
//!
//! Every request carries the configured browser User-Agent. Referers are
//! passed explicitly per request through [`FetchRequest`], never stored as
//! mutable client state.

mod fetcher;

pub use fetcher::{build_download_client, build_http_client, Fetcher, FetchRequest, Method, Page};

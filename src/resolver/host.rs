use crate::catalog::DownloadLink;
use crate::config::HostsConfig;
use std::fmt;

/// Mirror host families the resolvers know how to unwrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// Unauthenticated redirect host resolved over plain HTTP
    Lightweight,
    /// Multi-quality redirector resolved through a browser
    Aggregator,
    /// No resolver handles this mirror
    Unsupported,
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lightweight => "lightweight",
            Self::Aggregator => "aggregator",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// Classifies a mirror link into a host family
///
/// Lightweight URL markers take priority, then aggregator server-name
/// markers (strict or loose) and aggregator URL markers.
pub fn classify_host(link: &DownloadLink, hosts: &HostsConfig) -> HostKind {
    if hosts
        .lightweight_markers
        .iter()
        .any(|marker| link.redirect_url.contains(marker.as_str()))
    {
        return HostKind::Lightweight;
    }

    if is_strict_aggregator(link, hosts) || is_loose_aggregator(link, hosts) {
        return HostKind::Aggregator;
    }

    if hosts
        .aggregator_url_markers
        .iter()
        .any(|marker| link.redirect_url.contains(marker.as_str()))
    {
        return HostKind::Aggregator;
    }

    HostKind::Unsupported
}

/// Server name carries the exact aggregator marker
pub(crate) fn is_strict_aggregator(link: &DownloadLink, hosts: &HostsConfig) -> bool {
    !hosts.aggregator_server_marker.is_empty()
        && link
            .server_name
            .contains(hosts.aggregator_server_marker.as_str())
}

/// Server name loosely hints at a multi-download mirror
pub(crate) fn is_loose_aggregator(link: &DownloadLink, hosts: &HostsConfig) -> bool {
    hosts
        .loose_server_markers
        .iter()
        .any(|marker| link.server_name.contains(marker.as_str()))
}

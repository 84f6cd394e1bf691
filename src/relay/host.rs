//! Target host extraction and allow-listing.
//!
//! # Design Decisions
//! - The allow-list is built once at startup and never mutated
//! - Host extraction is a strategy so a stricter parser can replace the
//!   legacy `split('/')` convention without touching the validator
//! - Membership is an exact string comparison; a port is part of the token

use std::collections::HashSet;

use crate::config::HostExtraction;

/// Extracts the host token a target URL is checked against.
pub trait HostExtractor: Send + Sync + std::fmt::Debug {
    /// Returns the host token, or `None` if none can be found.
    fn extract(&self, target: &str) -> Option<String>;
}

/// Legacy convention: split on `/` and take the third segment,
/// i.e. `[userinfo@]host[:port]` in `scheme://host[:port]/path`.
///
/// The segment is only returned when a full URL parse connects to the same
/// authority. Shapes such as `http:/a/b` or `http:\\a/b` split one way and
/// parse another, so they yield no token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentHostExtractor;

impl HostExtractor for SegmentHostExtractor {
    fn extract(&self, target: &str) -> Option<String> {
        let segment = target
            .split('/')
            .nth(2)
            .filter(|segment| !segment.is_empty())?;

        let url = url::Url::parse(target).ok()?;
        authority_matches(&url, segment).then(|| segment.to_string())
    }
}

/// Whether `token` names the authority `url` will actually connect to.
/// An explicit default port (`host:80` for http) is accepted.
fn authority_matches(url: &url::Url, token: &str) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };

    let mut authority = String::new();
    if !url.username().is_empty() || url.password().is_some() {
        authority.push_str(url.username());
        if let Some(password) = url.password() {
            authority.push(':');
            authority.push_str(password);
        }
        authority.push('@');
    }
    authority.push_str(host);

    match (url.port(), url.port_or_known_default()) {
        (Some(port), _) => token.eq_ignore_ascii_case(&format!("{}:{}", authority, port)),
        (None, Some(default)) => {
            token.eq_ignore_ascii_case(&authority)
                || token.eq_ignore_ascii_case(&format!("{}:{}", authority, default))
        }
        (None, None) => token.eq_ignore_ascii_case(&authority),
    }
}

/// Strict extraction via a full URL parse. Yields `host` or `host:port`
/// (lowercased, userinfo dropped) and rejects non-HTTP schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParsedHostExtractor;

impl HostExtractor for ParsedHostExtractor {
    fn extract(&self, target: &str) -> Option<String> {
        let url = url::Url::parse(target).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

/// Build the extractor selected in configuration.
pub fn extractor_for(kind: HostExtraction) -> Box<dyn HostExtractor> {
    match kind {
        HostExtraction::Segment => Box::new(SegmentHostExtractor),
        HostExtraction::Parsed => Box::new(ParsedHostExtractor),
    }
}

/// Immutable set of hosts the relay may contact.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    hosts: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Hosts in sorted order, for display.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.hosts.iter().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }
}

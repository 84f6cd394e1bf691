//! Ordered request parameters.
//!
//! # Responsibilities
//! - Parse `application/x-www-form-urlencoded` input (query strings, POST bodies)
//! - Keep keys unique while preserving first-occurrence order
//! - Render parameters back as `key=value` pairs joined by `&`
//!
//! # Design Decisions
//! - Values are percent-decoded once on parse and never re-encoded on render
//! - A repeated key keeps its original position but takes the latest value

use url::form_urlencoded;

/// An ordered mapping of parameter names to values with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList {
    pairs: Vec<(String, String)>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse form-encoded bytes such as a raw query string or a POST body.
    pub fn parse(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Insert a parameter, replacing the value in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Copy of this list without the given key.
    pub fn without(&self, key: &str) -> Self {
        Self {
            pairs: self.pairs.iter().filter(|(k, _)| k != key).cloned().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as `k1=v1&k2=v2` without a trailing separator.
    pub fn to_pair_string(&self) -> String {
        join_pairs(self.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = ParamList::new();
        for (k, v) in iter {
            list.insert(k, v);
        }
        list
    }
}

/// Join pairs as `key=value` separated by `&`. No escaping is applied.
pub fn join_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (k, v) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    out
}

//! `Set-Cookie` domain rewriting.
//!
//! A [`CookieDomainMap`] maps the `Domain` attribute found in an upstream
//! cookie to the value the client should see. The `*` entry is the fallback
//! for unlisted domains; an empty fallback removes the attribute.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::rewrite::submatch::replace_all_submatch;

/// Key of the fallback entry.
pub const WILDCARD: &str = "*";

static DOMAIN_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\s*; Domain=)([^;]+)").expect("domain attribute pattern compiles")
});

/// Outcome of looking a cookie domain up in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Substitute this domain value, keeping the `; Domain=` delimiter.
    Replace(&'a str),
    /// Delete the whole `; Domain=...` attribute.
    Remove,
    /// Leave the attribute untouched.
    Keep,
}

/// Static source-domain to destination-domain table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieDomainMap {
    entries: HashMap<String, String>,
}

impl CookieDomainMap {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolve a domain value.
    ///
    /// Lookups are exact and case-sensitive. A direct entry only wins when it
    /// is non-empty; an empty direct entry behaves like a missing one and falls
    /// through to the wildcard.
    pub fn resolve(&self, domain: &str) -> Resolution<'_> {
        if let Some(value) = self.entries.get(domain).filter(|v| !v.is_empty()) {
            return Resolution::Replace(value);
        }
        match self.entries.get(WILDCARD) {
            Some(value) if !value.is_empty() => Resolution::Replace(value),
            Some(_) => Resolution::Remove,
            None => Resolution::Keep,
        }
    }
}

impl From<BTreeMap<String, String>> for CookieDomainMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self::new(entries.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CookieDomainMap {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Rewrite the `Domain` attribute of a single `Set-Cookie` value.
///
/// Values without a `Domain` attribute, or whose domain resolves to
/// [`Resolution::Keep`], come back byte-for-byte unchanged.
pub fn rewrite_cookie_domain(header: &str, map: &CookieDomainMap) -> String {
    replace_all_submatch(&DOMAIN_ATTRIBUTE, header, |groups| {
        let (matched, prefix, previous) = (groups[0], groups[1], groups[2]);
        match map.resolve(previous) {
            Resolution::Replace(domain) => format!("{}{}", prefix, domain),
            Resolution::Remove => String::new(),
            Resolution::Keep => matched.to_string(),
        }
    })
}

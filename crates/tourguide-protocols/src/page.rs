//! Logical page identity.
//!
//! Steps are tagged with a logical page path and the visitor's location is
//! reduced to the same shape before comparing. Matching is exact after
//! normalization: `/settings` never matches a step tagged `/settings/advanced`.

use serde::{Deserialize, Serialize};

/// Literal file name that some hosts serve as the home page.
const HOME_MARKER: &str = "index.html";

/// A normalized logical page identifier. The empty identifier is home.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Normalize a raw page path.
    ///
    /// Strips one leading and one trailing `/`, and folds the `index.html`
    /// marker into the home identifier.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed == HOME_MARKER {
            return Self::home();
        }
        Self(trimmed.to_string())
    }

    /// The home identifier.
    pub fn home() -> Self {
        Self(String::new())
    }

    /// Check if this is the home identifier.
    pub fn is_home(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_home() {
            f.write_str("/")
        } else {
            write!(f, "/{}", self.0)
        }
    }
}

/// The visitor's current location, reduced to what page matching needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Path component (without query string).
    pub path: String,
    /// Fragment without the leading `#`, if non-empty.
    pub hash: Option<String>,
}

impl Location {
    /// Create a location from a path and optional fragment.
    pub fn new(path: impl Into<String>, hash: Option<String>) -> Self {
        let hash = hash.filter(|h| !h.is_empty());
        Self {
            path: path.into(),
            hash,
        }
    }

    /// Parse an absolute URL or a site-relative href.
    pub fn parse(href: &str) -> Self {
        if let Ok(url) = url::Url::parse(href) {
            return Self::new(url.path(), url.fragment().map(|f| f.to_string()));
        }

        let (before_hash, hash) = match href.split_once('#') {
            Some((before, frag)) => (before, Some(frag.to_string())),
            None => (href, None),
        };
        let path = before_hash.split('?').next().unwrap_or_default();
        Self::new(path, hash)
    }

    /// Logical page identifier: the fragment when present (hash routing),
    /// otherwise the path.
    pub fn page_id(&self) -> PageId {
        match &self.hash {
            Some(hash) => PageId::normalize(hash),
            None => PageId::normalize(&self.path),
        }
    }

    /// Whether this location routes pages through the fragment (`#/route`).
    pub fn uses_hash_routing(&self) -> bool {
        self.hash.as_deref().is_some_and(|h| h.starts_with('/'))
    }

    /// Href that reaches `page` from this location.
    pub fn href_for(&self, page: &PageId) -> String {
        if self.uses_hash_routing() {
            format!("#/{}", page.as_str())
        } else {
            format!("/{}", page.as_str())
        }
    }
}

//! Construction-time configuration for documents.
//!
//! A [`Config`] is supplied once, when a [`Document`](crate::Document) is
//! created, and is threaded by reference to every adapter and resolver that
//! needs it; there is no global state.
//!
//! ## Examples
//!
//! ```rust
//! use jsonapi_document::Config;
//!
//! let config = Config::new()
//!     .with_api_url("http://example.com/api/")
//!     .with_auto_set_links(true)
//!     .with_api_version(true);
//!
//! assert!(config.auto_set_links);
//! ```

use crate::adapter::ResourceMap;
use crate::{Error, Result};
use url::Url;

/// Configuration for a [`Document`](crate::Document).
///
/// - `resource_map`: domain type → adapter registry, required (non-empty) for
///   non-flexible documents
/// - `api_url`: base URL used for auto-generated `self` links; validated as a
///   well-formed absolute URL, trailing slash stripped
/// - `auto_set_links`: synthesize `links.self` for adapted resources that
///   declare no links of their own
/// - `show_api_version`: emit the top-level `jsonapi: {version}` member
///
/// # Examples
///
/// ```rust
/// use jsonapi_document::Config;
///
/// let config = Config::new().with_api_url("http://x/api");
/// assert_eq!(config.api_url.as_deref(), Some("http://x/api"));
/// ```
#[derive(Clone, Default)]
pub struct Config {
    pub resource_map: ResourceMap,
    pub api_url: Option<String>,
    pub auto_set_links: bool,
    pub show_api_version: bool,
}

impl Config {
    /// Creates an empty configuration (no resource map, no API URL).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource map used to adapt domain objects.
    #[must_use]
    pub fn with_resource_map(mut self, resource_map: ResourceMap) -> Self {
        self.resource_map = resource_map;
        self
    }

    /// Sets the base API URL. Validated when the document is constructed.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Enables or disables auto-generated `self` links.
    #[must_use]
    pub fn with_auto_set_links(mut self, auto_set_links: bool) -> Self {
        self.auto_set_links = auto_set_links;
        self
    }

    /// Enables or disables the top-level `jsonapi.version` member.
    #[must_use]
    pub fn with_api_version(mut self, show_api_version: bool) -> Self {
        self.show_api_version = show_api_version;
        self
    }

    /// Validates `api_url` and returns it with any trailing slash stripped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the URL does not parse as an
    /// absolute URL.
    pub(crate) fn normalized_api_url(&self) -> Result<Option<String>> {
        match &self.api_url {
            None => Ok(None),
            Some(raw) => {
                Url::parse(raw)
                    .map_err(|e| Error::invalid_config(format!("api_url `{raw}`: {e}")))?;
                Ok(Some(raw.trim_end_matches('/').to_string()))
            }
        }
    }

    /// Validates the configuration for a non-flexible document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the resource map is empty.
    pub(crate) fn require_resource_map(&self) -> Result<()> {
        if self.resource_map.is_empty() {
            return Err(Error::invalid_config(
                "resource_map must contain at least 1 entry",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trailing_slash_stripped() {
        let config = Config::new().with_api_url("http://example.com/api/");
        assert_eq!(
            config.normalized_api_url().unwrap(),
            Some("http://example.com/api".to_string())
        );
    }

    #[test]
    fn test_malformed_api_url_rejected() {
        let config = Config::new().with_api_url("not a url");
        assert!(matches!(
            config.normalized_api_url(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_resource_map_rejected() {
        let config = Config::new();
        assert!(matches!(
            config.require_resource_map(),
            Err(Error::InvalidConfig(_))
        ));
    }
}

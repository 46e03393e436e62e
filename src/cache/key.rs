//! Cache keys: resource identity plus Vary selector.

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::Vary;
use crate::http::{Request, RequestError, Response};

/// Normalized identity of a resource, derived from its absolute URI.
///
/// Normalization lower-cases the scheme and host, drops a default port,
/// turns an empty path into `/`, and removes the fragment. The query string
/// is kept: `?page=1` and `?page=2` are different resources.
///
/// Cloning is cheap; the normalized text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Arc<str>);

impl ResourceId {
    /// Derives the identity of an already parsed URI.
    pub fn from_url(url: &Url) -> Self {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        Self(Arc::from(normalized.as_str()))
    }

    /// Parses and normalizes an absolute URI.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUri`] if `uri` is not an absolute URI.
    ///
    /// # Examples
    ///
    /// ```
    /// use varycache::cache::ResourceId;
    ///
    /// let id = ResourceId::parse("HTTP://Example.com:80").unwrap();
    /// assert_eq!(id.as_str(), "http://example.com/");
    /// ```
    pub fn parse(uri: &str) -> Result<Self, RequestError> {
        let url = Url::parse(uri).map_err(|source| RequestError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;
        Ok(Self::from_url(&url))
    }

    /// Returns the normalized URI text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Identifies one stored representation: `(resource, vary)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    resource: ResourceId,
    vary: Vary,
}

impl Key {
    /// Builds a key from its parts.
    pub fn new(resource: ResourceId, vary: Vary) -> Self {
        Self { resource, vary }
    }

    /// Computes the key under which `response` is stored as the answer to `request`.
    ///
    /// # Examples
    ///
    /// ```
    /// use varycache::cache::Key;
    /// use varycache::http::{Request, Response, StatusCode};
    ///
    /// let request = Request::new("http://example.com/menu").unwrap().header("Accept-Language", "fr");
    /// let response = Response::new(StatusCode::OK).header("Vary", "Accept-Language");
    ///
    /// let key = Key::create(&request, &response);
    /// assert_eq!(key.resource().as_str(), "http://example.com/menu");
    /// assert_eq!(key.vary().get("accept-language"), Some("fr"));
    /// ```
    pub fn create(request: &Request, response: &Response) -> Self {
        Self {
            resource: request.resource_id().clone(),
            vary: Vary::from_exchange(request, response),
        }
    }

    /// Returns the resource identity.
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// Returns the Vary selector.
    pub fn vary(&self) -> &Vary {
        &self.vary
    }

    /// Splits the key into its parts.
    pub fn into_parts(self) -> (ResourceId, Vary) {
        (self.resource, self.vary)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vary.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{} [{}]", self.resource, self.vary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn keys_differ_by_vary() {
        let resp = Response::new(StatusCode::OK).header("Vary", "Accept-Language");
        let en = Request::new("http://example.com/").unwrap().header("Accept-Language", "en");
        let fr = Request::new("http://example.com/").unwrap().header("Accept-Language", "fr");
        let k_en = Key::create(&en, &resp);
        let k_fr = Key::create(&fr, &resp);
        assert_eq!(k_en.resource(), k_fr.resource());
        assert_ne!(k_en, k_fr);
    }

    #[test]
    fn keys_ignore_non_varying_headers() {
        let resp = Response::new(StatusCode::OK);
        let a = Request::new("http://example.com/").unwrap().header("User-Agent", "a");
        let b = Request::new("http://example.com/").unwrap().header("User-Agent", "b");
        assert_eq!(Key::create(&a, &resp), Key::create(&b, &resp));
    }

    #[test]
    fn resource_id_parse_rejects_relative() {
        assert!(ResourceId::parse("no-scheme").is_err());
    }

    #[test]
    fn display_includes_vary_when_present() {
        let id = ResourceId::parse("http://example.com/a").unwrap();
        assert_eq!(Key::new(id.clone(), Vary::empty()).to_string(), "http://example.com/a");
        let key = Key::new(id, Vary::new([("Accept", "text/html")]));
        assert_eq!(key.to_string(), "http://example.com/a [accept=text/html]");
    }
}

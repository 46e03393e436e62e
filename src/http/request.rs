//! Cache-facing view of an HTTP request.
//!
//! The storage only needs two things from a request: the normalized identity
//! of the target resource and the values of its negotiation headers. The URI
//! is parsed and normalized once, at construction, with the [`url`] crate.

use thiserror::Error;
use url::Url;

use super::Headers;
use crate::cache::ResourceId;

/// Errors that can occur while building a [`Request`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request URI {uri:?} does not identify a hierarchical resource")]
    NotHierarchical { uri: String },
}

/// An HTTP request as seen by the cache: absolute target URI and headers.
///
/// The method is not modeled. Deciding which methods may read or populate
/// the cache belongs to the caller.
///
/// # Examples
///
/// ```
/// use varycache::http::Request;
///
/// let request = Request::new("HTTP://Example.COM:80/docs#intro")
///     .unwrap()
///     .header("Accept-Language", "en");
///
/// assert_eq!(request.resource_id().as_str(), "http://example.com/docs");
/// assert_eq!(request.headers().get("accept-language"), Some("en"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    uri: Url,
    resource: ResourceId,
    headers: Headers,
}

impl Request {
    /// Builds a request for the absolute URI `uri`.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidUri`]: `uri` is not a valid absolute URI.
    /// - [`RequestError::NotHierarchical`]: `uri` has no authority/path
    ///   structure (e.g. `mailto:` or `data:` URIs).
    pub fn new(uri: &str) -> Result<Self, RequestError> {
        let parsed = Url::parse(uri).map_err(|source| RequestError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(RequestError::NotHierarchical {
                uri: uri.to_owned(),
            });
        }
        let resource = ResourceId::from_url(&parsed);
        Ok(Self {
            uri: parsed,
            resource,
            headers: Headers::new(),
        })
    }

    /// Appends a request header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the parsed target URI, fragment included.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Returns the normalized identity of the target resource.
    pub fn resource_id(&self) -> &ResourceId {
        &self.resource
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_scheme_host_and_default_port() {
        let req = Request::new("HTTPS://Example.org:443").unwrap();
        assert_eq!(req.resource_id().as_str(), "https://example.org/");
    }

    #[test]
    fn fragment_is_not_part_of_identity() {
        let a = Request::new("http://example.com/a?x=1#top").unwrap();
        let b = Request::new("http://example.com/a?x=1").unwrap();
        assert_eq!(a.resource_id(), b.resource_id());
        assert_eq!(a.uri().fragment(), Some("top"));
    }

    #[test]
    fn query_is_part_of_identity() {
        let a = Request::new("http://example.com/search?q=rust").unwrap();
        let b = Request::new("http://example.com/search?q=go").unwrap();
        assert_ne!(a.resource_id(), b.resource_id());
    }

    #[test]
    fn relative_uri_is_rejected() {
        assert!(matches!(
            Request::new("/relative/path"),
            Err(RequestError::InvalidUri { .. })
        ));
    }

    #[test]
    fn opaque_uri_is_rejected() {
        assert!(matches!(
            Request::new("mailto:someone@example.com"),
            Err(RequestError::NotHierarchical { .. })
        ));
    }
}

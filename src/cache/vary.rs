//! Content-negotiation selectors.
//!
//! A [`Vary`] records, for each header name an origin listed in its `Vary`
//! response header, the value the request carried when the response was
//! stored. A later request can reuse that stored representation only if it
//! carries the same values.

use std::collections::BTreeMap;
use std::fmt;

use crate::http::{Request, Response};

/// Ordered set of `(header name, request value)` pairs selecting one
/// representation of a resource.
///
/// Header names are stored lower-cased. A header missing from the request is
/// recorded as the empty string, so absence only matches absence (or an
/// explicitly empty value), never "anything".
///
/// # Examples
///
/// ```
/// use varycache::cache::Vary;
/// use varycache::http::{Request, Response, StatusCode};
///
/// let stored_for = Request::new("http://example.com/").unwrap().header("Accept-Language", "en");
/// let response = Response::new(StatusCode::OK).header("Vary", "Accept-Language");
/// let vary = Vary::from_exchange(&stored_for, &response);
///
/// let english = Request::new("http://example.com/").unwrap().header("accept-language", "en");
/// let french = Request::new("http://example.com/").unwrap().header("Accept-Language", "fr");
/// assert!(vary.matches(&english));
/// assert!(!vary.matches(&french));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vary {
    headers: BTreeMap<String, String>,
    wildcard: bool,
}

impl Vary {
    /// A selector with no negotiation headers; matches every request.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a selector from explicit `(name, value)` pairs.
    pub fn new<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        Self {
            headers: pairs
                .into_iter()
                .map(|(n, v)| (n.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            wildcard: false,
        }
    }

    /// Computes the selector for storing `response` as the answer to `request`.
    ///
    /// Every comma-separated name in the response's `Vary` header(s) is
    /// paired with the request's value for that header. `Vary: *` produces a
    /// wildcard selector, which never matches a later request (RFC 9111 §4.1).
    pub fn from_exchange(request: &Request, response: &Response) -> Self {
        let mut vary = Self::empty();
        for field in response.headers().get_all("vary") {
            for name in field.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                if name == "*" {
                    vary.wildcard = true;
                    continue;
                }
                let value = request.headers().combined(name).unwrap_or_default();
                vary.headers.insert(name.to_ascii_lowercase(), value);
            }
        }
        vary
    }

    /// Returns `true` if `request` carries exactly the recorded values.
    pub fn matches(&self, request: &Request) -> bool {
        if self.wildcard {
            return false;
        }
        self.headers.iter().all(|(name, expected)| {
            let actual = request.headers().combined(name);
            actual.as_deref().unwrap_or("") == expected.as_str()
        })
    }

    /// Returns `true` if the origin answered with `Vary: *`.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Returns `true` if no negotiation headers are recorded.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && !self.wildcard
    }

    /// Returns the recorded value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterates the recorded `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Vary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            f.write_str("*")?;
            if !self.headers.is_empty() {
                f.write_str("; ")?;
            }
        }
        let mut first = true;
        for (name, value) in &self.headers {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    fn request() -> Request {
        Request::new("http://example.com/doc").unwrap()
    }

    fn varying_on(names: &str) -> Response {
        Response::new(StatusCode::OK).header("Vary", names)
    }

    // ── from_exchange ─────────────────────────────────────────────────────────

    #[test]
    fn no_vary_header_gives_empty_selector() {
        let v = Vary::from_exchange(&request(), &Response::new(StatusCode::OK));
        assert!(v.is_empty());
        assert!(v.matches(&request().header("Accept", "anything")));
    }

    #[test]
    fn records_request_values_for_listed_names() {
        let req = request()
            .header("Accept-Language", "en")
            .header("Accept-Encoding", "gzip");
        let v = Vary::from_exchange(&req, &varying_on("Accept-Language, Accept-Encoding"));
        assert_eq!(v.get("accept-language"), Some("en"));
        assert_eq!(v.get("ACCEPT-ENCODING"), Some("gzip"));
    }

    #[test]
    fn repeated_vary_fields_are_merged() {
        let resp = Response::new(StatusCode::OK)
            .header("Vary", "Accept")
            .header("vary", "Accept-Language");
        let req = request().header("Accept", "text/html");
        let v = Vary::from_exchange(&req, &resp);
        assert_eq!(v.iter().count(), 2);
        assert_eq!(v.get("accept-language"), Some(""));
    }

    #[test]
    fn equal_selectors_compare_equal_regardless_of_name_case() {
        let a = Vary::new([("Accept-Language", "en")]);
        let b = Vary::new([("accept-language", "en")]);
        assert_eq!(a, b);
        assert_ne!(a, Vary::new([("accept-language", "fr")]));
    }

    // ── matches ───────────────────────────────────────────────────────────────

    #[test]
    fn absent_header_matches_only_absence() {
        let v = Vary::from_exchange(&request(), &varying_on("Accept-Language"));
        assert!(v.matches(&request()));
        assert!(!v.matches(&request().header("Accept-Language", "en")));
    }

    #[test]
    fn present_header_does_not_match_absence() {
        let v = Vary::new([("accept-language", "en")]);
        assert!(!v.matches(&request()));
    }

    #[test]
    fn multi_valued_request_header_compares_combined() {
        let stored = request()
            .header("Accept-Language", "en")
            .header("Accept-Language", "fr");
        let v = Vary::from_exchange(&stored, &varying_on("Accept-Language"));
        assert_eq!(v.get("accept-language"), Some("en, fr"));
        assert!(v.matches(&stored));
        assert!(!v.matches(&request().header("Accept-Language", "en")));
    }

    #[test]
    fn wildcard_never_matches() {
        let v = Vary::from_exchange(&request(), &varying_on("*"));
        assert!(v.is_wildcard());
        assert!(!v.is_empty());
        assert!(!v.matches(&request()));
    }

    #[test]
    fn display_lists_pairs() {
        let v = Vary::new([("Accept", "text/html"), ("Accept-Language", "en")]);
        assert_eq!(v.to_string(), "accept=text/html; accept-language=en");
    }
}

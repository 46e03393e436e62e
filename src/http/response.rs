//! HTTP response with an optional, shareable payload.
//!
//! Responses are cheap to clone: the payload sits behind an [`Arc`], so a
//! cached response can be handed to many readers without copying its body.

use std::sync::Arc;

use bytes::Bytes;

use super::payload::DEFAULT_MIME_TYPE;
use super::{ByteArrayPayload, Headers, Payload, StatusCode};

/// An HTTP response: status, headers, and an optional [`Payload`].
///
/// # Examples
///
/// ```
/// use varycache::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::OK)
///     .header("Vary", "Accept-Language")
///     .body("bonjour");
///
/// assert!(response.has_payload());
/// assert_eq!(response.headers().get("vary"), Some("Accept-Language"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    payload: Option<Arc<dyn Payload>>,
}

impl Response {
    /// Creates a new response with the given status and no payload.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            payload: None,
        }
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a header in-place.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Sets a UTF-8 text payload.
    #[must_use]
    pub fn body(self, body: impl Into<String>) -> Self {
        let text: String = body.into();
        self.payload(ByteArrayPayload::new(text, "text/plain; charset=utf-8"))
    }

    /// Sets a raw byte payload of type `application/octet-stream`.
    #[must_use]
    pub fn body_bytes(self, body: impl Into<Bytes>) -> Self {
        self.payload(ByteArrayPayload::new(body, DEFAULT_MIME_TYPE))
    }

    /// Sets an arbitrary payload.
    #[must_use]
    pub fn payload(mut self, payload: impl Payload + 'static) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Replaces the payload with an already shared one (or removes it).
    #[must_use]
    pub fn with_payload(mut self, payload: Option<Arc<dyn Payload>>) -> Self {
        self.payload = payload;
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the payload, if any.
    pub fn payload_ref(&self) -> Option<&Arc<dyn Payload>> {
        self.payload.as_ref()
    }

    /// Returns `true` if the response carries a payload.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn text_body_is_buffered_utf8() {
        let r = Response::new(StatusCode::OK).body("hi");
        let payload = r.payload_ref().unwrap();
        assert_eq!(payload.mime_type(), "text/plain; charset=utf-8");
        assert!(payload.is_buffered());
    }

    #[test]
    fn clones_share_the_payload() {
        let r = Response::new(StatusCode::OK).body_bytes(vec![1u8, 2, 3]);
        let copy = r.clone();
        assert!(Arc::ptr_eq(
            r.payload_ref().unwrap(),
            copy.payload_ref().unwrap()
        ));

        let mut buf = Vec::new();
        copy.payload_ref().unwrap().open().unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3]);
    }

    #[test]
    fn with_payload_none_strips_body() {
        let r = Response::new(StatusCode::NO_CONTENT).body("x").with_payload(None);
        assert!(!r.has_payload());
    }
}

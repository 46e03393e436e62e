//! Response payloads.
//!
//! A [`Payload`] is a MIME-typed byte source. Two implementations ship with
//! the crate:
//!
//! - [`ByteArrayPayload`]: fully buffered in memory, re-readable any number
//!   of times. This is the only shape the storage keeps.
//! - [`StreamPayload`]: a single-use [`Read`] source, typically the body of
//!   an upstream response as it arrives. It can be read exactly once.

use std::fmt;
use std::io::{self, Read};

use bytes::{BufMut, Bytes, BytesMut};
use parking_lot::Mutex;

/// MIME type used when a payload does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A MIME-typed source of response body bytes.
pub trait Payload: fmt::Debug + Send + Sync {
    /// Returns the payload's MIME type, e.g. `text/html; charset=utf-8`.
    fn mime_type(&self) -> &str;

    /// Opens a reader over the payload content.
    ///
    /// # Errors
    ///
    /// Returns an error when the content can no longer be read, for instance
    /// when a single-use stream has already been consumed.
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Returns `true` while [`open`](Self::open) can still produce the content.
    fn is_available(&self) -> bool;

    /// Returns `true` if the content lives in memory and can be re-read.
    fn is_buffered(&self) -> bool {
        false
    }

    /// Returns the content length in bytes, when known up front.
    fn length(&self) -> Option<u64> {
        None
    }
}

/// A payload held entirely in memory.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use varycache::http::{ByteArrayPayload, Payload};
///
/// let payload = ByteArrayPayload::new("hello", "text/plain");
/// let mut body = String::new();
/// payload.open().unwrap().read_to_string(&mut body).unwrap();
/// assert_eq!(body, "hello");
/// assert!(payload.is_buffered());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArrayPayload {
    data: Bytes,
    mime_type: String,
}

impl ByteArrayPayload {
    /// Wraps already-buffered bytes.
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Reads `reader` to completion into memory.
    ///
    /// When `max_bytes` is set, a source producing more than `max_bytes`
    /// bytes is rejected with [`io::ErrorKind::InvalidData`].
    ///
    /// # Errors
    ///
    /// Propagates any read error from `reader`, or the size-limit error above.
    pub fn from_reader(
        reader: &mut dyn Read,
        mime_type: impl Into<String>,
        max_bytes: Option<u64>,
    ) -> io::Result<Self> {
        let mut writer = BytesMut::new().writer();
        match max_bytes {
            Some(limit) => {
                let copied = io::copy(&mut reader.take(limit.saturating_add(1)), &mut writer)?;
                if copied > limit {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("payload exceeds {limit} bytes"),
                    ));
                }
            }
            None => {
                io::copy(reader, &mut writer)?;
            }
        }
        Ok(Self::new(writer.into_inner().freeze(), mime_type))
    }

    /// Returns the buffered content.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl Payload for ByteArrayPayload {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(&self.data[..]))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn is_buffered(&self) -> bool {
        true
    }

    fn length(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

/// A single-use streaming payload.
///
/// The first call to [`open`](Payload::open) hands out the underlying reader;
/// every later call fails. The storage buffers such payloads into a
/// [`ByteArrayPayload`] before keeping them.
pub struct StreamPayload {
    reader: Mutex<Option<Box<dyn Read + Send>>>,
    mime_type: String,
    length: Option<u64>,
}

impl StreamPayload {
    /// Wraps a reader of unknown length.
    pub fn new(reader: impl Read + Send + 'static, mime_type: impl Into<String>) -> Self {
        Self {
            reader: Mutex::new(Some(Box::new(reader))),
            mime_type: mime_type.into(),
            length: None,
        }
    }

    /// Records the expected content length, typically from `Content-Length`.
    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
}

impl fmt::Debug for StreamPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPayload")
            .field("mime_type", &self.mime_type)
            .field("length", &self.length)
            .field("consumed", &!self.is_available())
            .finish()
    }
}

impl Payload for StreamPayload {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        match self.reader.lock().take() {
            Some(reader) => Ok(reader),
            None => Err(io::Error::other("payload stream already consumed")),
        }
    }

    fn is_available(&self) -> bool {
        self.reader.lock().is_some()
    }

    fn length(&self) -> Option<u64> {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(payload: &dyn Payload) -> Vec<u8> {
        let mut out = Vec::new();
        payload.open().unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn byte_array_is_rereadable() {
        let p = ByteArrayPayload::new(&b"abc"[..], "text/plain");
        assert_eq!(read_all(&p), b"abc");
        assert_eq!(read_all(&p), b"abc");
        assert_eq!(p.length(), Some(3));
    }

    #[test]
    fn stream_is_single_use() {
        let p = StreamPayload::new(io::Cursor::new(b"once".to_vec()), "text/plain");
        assert!(p.is_available());
        assert!(!p.is_buffered());
        assert_eq!(read_all(&p), b"once");
        assert!(!p.is_available());
        assert!(p.open().is_err());
    }

    #[test]
    fn from_reader_buffers_everything() {
        let mut src = io::Cursor::new(vec![7u8; 10_000]);
        let p = ByteArrayPayload::from_reader(&mut src, "image/png", None).unwrap();
        assert_eq!(p.bytes().len(), 10_000);
        assert_eq!(p.mime_type(), "image/png");
    }

    #[test]
    fn from_reader_enforces_limit() {
        let mut exact = io::Cursor::new(vec![0u8; 16]);
        assert!(ByteArrayPayload::from_reader(&mut exact, "x/y", Some(16)).is_ok());

        let mut over = io::Cursor::new(vec![0u8; 17]);
        let err = ByteArrayPayload::from_reader(&mut over, "x/y", Some(16)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}

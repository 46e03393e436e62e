//! HTTP/1.1 serialization of stored responses.
//!
//! The coordinator that sits on top of the storage uses this to replay a
//! cached response onto the wire. Stored bodies are always complete byte
//! sequences, so the writer owns message framing: a stored
//! `Transfer-Encoding` is never replayed and the body length is measured.

use std::io;

use bytes::{BufMut, BytesMut};

use super::{Payload, Response, StatusCode};

/// Serializes `response` into HTTP/1.1 wire format.
///
/// Framing follows RFC 9112 §6:
///
/// - `1xx` and `204` responses carry neither a body nor `Content-Length`.
/// - `304` carries no body; an origin `Content-Length` describing the
///   selected representation is kept, none is synthesized.
/// - Every other response gets a `Content-Length` equal to the number of
///   body bytes written, and a `Content-Type` from the payload's MIME type
///   unless one is already present.
///
/// # Errors
///
/// Returns the payload's read error if its content cannot be read, e.g. a
/// single-use stream that was already consumed, or `InvalidData` if the
/// payload produces a different number of bytes than it declared.
///
/// # Examples
///
/// ```
/// use varycache::http::{Response, StatusCode, writer::write_response};
///
/// let response = Response::new(StatusCode::OK).body("cached");
/// let bytes = write_response(&response).unwrap();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.ends_with("Content-Length: 6\r\n\r\ncached"));
/// ```
pub fn write_response(response: &Response) -> io::Result<BytesMut> {
    let status = response.status();
    let headers = response.headers();
    let payload = response.payload_ref().filter(|_| permits_body(status));

    let body_hint = payload
        .and_then(|p| p.length())
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let mut buf = BytesMut::with_capacity(128 + headers.len() * 64 + body_hint);

    buf.put(
        format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .as_bytes(),
    );

    for (name, value) in headers.iter() {
        if name.eq_ignore_ascii_case("transfer-encoding") {
            continue;
        }
        if name.eq_ignore_ascii_case("content-length") && status != StatusCode::NOT_MODIFIED {
            continue;
        }
        buf.put(format!("{name}: {value}\r\n").as_bytes());
    }

    if !permits_body(status) {
        buf.put_slice(b"\r\n");
        return Ok(buf);
    }

    match payload {
        Some(payload) => write_body(&mut buf, &**payload, !headers.contains("content-type"))?,
        None => buf.put_slice(b"Content-Length: 0\r\n\r\n"),
    }

    Ok(buf)
}

// 1xx, 204 and 304 responses never carry a message body.
fn permits_body(status: StatusCode) -> bool {
    !(status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}

// Writes the payload framing headers, the blank line, and the body.
fn write_body(buf: &mut BytesMut, payload: &dyn Payload, with_type: bool) -> io::Result<()> {
    if with_type {
        buf.put(format!("Content-Type: {}\r\n", payload.mime_type()).as_bytes());
    }

    let mut reader = payload.open()?;
    match payload.length() {
        Some(declared) => {
            buf.put(format!("Content-Length: {declared}\r\n\r\n").as_bytes());
            let written = io::copy(&mut reader, &mut (&mut *buf).writer())?;
            if written != declared {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("payload declared {declared} bytes but produced {written}"),
                ));
            }
        }
        None => {
            let mut body = BytesMut::new();
            io::copy(&mut reader, &mut (&mut body).writer())?;
            buf.put(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
            buf.extend_from_slice(&body);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StreamPayload;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn written(r: &Response) -> String {
        to_string(write_response(r).unwrap())
    }

    // ── bodies ────────────────────────────────────────────────────────────────

    #[test]
    fn writes_status_headers_and_body() {
        let s = written(
            &Response::new(StatusCode::OK)
                .header("Vary", "Accept")
                .body("Hello"),
        );
        assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(s.contains("Vary: Accept\r\n"));
        assert!(s.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(s.contains("Content-Length: 5\r\n"));
        assert!(s.ends_with("\r\n\r\nHello"));
    }

    #[test]
    fn missing_payload_is_an_empty_body() {
        let s = written(&Response::new(StatusCode::OK));
        assert!(!s.contains("Content-Type"));
        assert!(s.ends_with("Content-Length: 0\r\n\r\n"));
    }

    #[test]
    fn origin_content_length_is_replaced_by_actual_length() {
        let s = written(
            &Response::new(StatusCode::OK)
                .header("Content-Length", "99")
                .body("abc"),
        );
        assert_eq!(s.matches("Content-Length").count(), 1);
        assert!(s.contains("Content-Length: 3\r\n"));
    }

    #[test]
    fn unregistered_status_has_empty_reason() {
        let status = StatusCode::from_u16(299).unwrap();
        let s = written(&Response::new(status));
        assert!(s.starts_with("HTTP/1.1 299 \r\n"));
    }

    // ── framing ───────────────────────────────────────────────────────────────

    #[test]
    fn no_content_has_no_length_or_body() {
        let s = written(&Response::new(StatusCode::NO_CONTENT));
        assert_eq!(s, "HTTP/1.1 204 No Content\r\n\r\n");

        let s = written(
            &Response::new(StatusCode::NO_CONTENT)
                .header("Content-Length", "0")
                .body("stray"),
        );
        assert_eq!(s, "HTTP/1.1 204 No Content\r\n\r\n");
    }

    #[test]
    fn informational_has_no_length() {
        let s = written(&Response::new(StatusCode::CONTINUE));
        assert_eq!(s, "HTTP/1.1 100 Continue\r\n\r\n");
    }

    #[test]
    fn not_modified_keeps_origin_length_but_writes_no_body() {
        let s = written(&Response::new(StatusCode::NOT_MODIFIED));
        assert!(!s.contains("Content-Length"));
        assert!(!s.contains("Content-Type"));

        let s = written(
            &Response::new(StatusCode::NOT_MODIFIED)
                .header("ETag", "\"v1\"")
                .header("Content-Length", "42")
                .body("ignored"),
        );
        assert!(s.contains("Content-Length: 42\r\n"));
        assert_eq!(s.matches("Content-Length").count(), 1);
        assert!(s.ends_with("ETag: \"v1\"\r\nContent-Length: 42\r\n\r\n"));
    }

    #[test]
    fn chunked_transfer_encoding_is_not_replayed() {
        let s = written(
            &Response::new(StatusCode::OK)
                .header("Transfer-Encoding", "chunked")
                .body("Hello"),
        );
        assert!(!s.to_ascii_lowercase().contains("transfer-encoding"));
        assert_eq!(s.matches("Content-Length").count(), 1);
        assert!(s.ends_with("Content-Length: 5\r\n\r\nHello"));
    }

    // ── streams ───────────────────────────────────────────────────────────────

    #[test]
    fn stream_without_length_is_measured() {
        let r = Response::new(StatusCode::OK)
            .payload(StreamPayload::new(io::Cursor::new(b"streamed".to_vec()), "text/plain"));
        let s = written(&r);
        assert!(s.ends_with("Content-Length: 8\r\n\r\nstreamed"));
    }

    #[test]
    fn stream_shorter_than_declared_is_an_error() {
        let r = Response::new(StatusCode::OK).payload(
            StreamPayload::new(io::Cursor::new(b"short".to_vec()), "text/plain").with_length(10),
        );
        let err = write_response(&r).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn consumed_stream_is_an_error() {
        let r = Response::new(StatusCode::OK)
            .payload(StreamPayload::new(io::empty(), "text/plain"));
        assert!(write_response(&r).is_ok());
        assert!(write_response(&r).is_err());
    }
}

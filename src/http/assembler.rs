//! Axum-facing response sink.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};

use crate::intercept::ResponseSink;

/// Collects status, headers and body written through the sink contract into
/// the parts an axum `Response` is assembled from.
///
/// Deliberately implements none of the optional capabilities: flushing is
/// meaningless for an in-memory sink and the axum layer owns the connection,
/// so hijack attempts degrade to `CapabilityUnsupported`.
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    status_written: bool,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a status line was written.
    pub fn status_written(&self) -> bool {
        self.status_written
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body.freeze())
    }
}

impl ResponseSink for ResponseAssembler {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        // First status wins, matching the interceptor's own idempotence.
        if !self.status_written {
            self.status = status;
            self.status_written = true;
        }
        Ok(())
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

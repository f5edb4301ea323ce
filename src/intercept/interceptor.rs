//! Response interception state machine.
//!
//! # Responsibilities
//! - Record the first status an upstream handler writes (explicitly, or
//!   implicitly on the first body write or flush)
//! - Buffer header writes privately until the status is known to be safe
//! - Freeze delivery for filtered statuses; pass everything else through
//!   unmodified and unbuffered
//! - Forward optional sink capabilities resolved once at wrap time
//!
//! # States
//! ```text
//! OPEN ──status in ranges──▶ FILTERED   (body dropped, sink untouched)
//!   └───status not in ranges──▶ COMMITTED (transparent pass-through)
//! ```
//! Both terminal states are sticky: later status writes are ignored.

use std::io;
use std::sync::Arc;

use http::{HeaderMap, StatusCode};

use crate::intercept::ranges::StatusRanges;
use crate::intercept::sink::{
    DisconnectSignal, HijackedConn, ResponseSink, SinkCapabilities, SinkError,
};

/// Wraps a real response sink for exactly one request/response cycle and
/// diverts control flow the instant a filtered status is detected.
pub struct Interceptor<S: ResponseSink> {
    sink: S,
    sink_type: &'static str,
    caps: SinkCapabilities,
    ranges: Arc<StatusRanges>,
    header_buf: HeaderMap,
    status: StatusCode,
    headers_sent: bool,
    filtered: bool,
}

impl<S: ResponseSink> Interceptor<S> {
    /// Wrap `sink`, probing its optional capabilities once.
    pub fn new(mut sink: S, ranges: Arc<StatusRanges>) -> Self {
        let caps = SinkCapabilities::probe(&mut sink);
        let sink_type = sink.sink_type();
        Self {
            sink,
            sink_type,
            caps,
            ranges,
            header_buf: HeaderMap::new(),
            // If the handler never writes a status, we consider it a 200.
            status: StatusCode::OK,
            headers_sent: false,
            filtered: false,
        }
    }

    /// Headers buffered ahead of the status transition. Never the real
    /// sink's headers: speculative writes stay private until the status is
    /// known to be safe to forward.
    pub fn headers(&self) -> &HeaderMap {
        &self.header_buf
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.header_buf
    }

    /// Take ownership of the buffered headers. Meant for callers building a
    /// substitute response after a filtered status was caught.
    pub fn take_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.header_buf)
    }

    /// The first status the upstream handler wrote, or 200 if it never did.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the observed status fell into a configured range and the
    /// response was suppressed pending substitution.
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Capability snapshot taken at wrap time.
    pub fn capabilities(&self) -> SinkCapabilities {
        self.caps
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Release the wrapped sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// One-time guarded transition. No-ops once committed or filtered.
    ///
    /// On a non-filtered status, every buffered header value is appended
    /// after any the sink already holds (multi-value order preserved), then
    /// the status is forwarded.
    pub fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        if self.headers_sent || self.filtered {
            return Ok(());
        }

        self.status = status;
        if self.ranges.contains(status.as_u16()) {
            self.filtered = true;
            // The caller decides what reaches the real sink from here on.
            return Ok(());
        }

        // Mark sent before the sink write so a failed write can never
        // merge the buffered headers a second time.
        self.headers_sent = true;
        merge_headers(self.sink.headers_mut(), &self.header_buf);
        self.sink.write_status(status)
    }

    /// Write body bytes, committing the current status first if the handler
    /// never did. Filtered responses swallow the bytes but report the full
    /// count so upstream handlers keep writing normally.
    pub fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_status(self.status)?;

        if self.filtered {
            return Ok(buf.len());
        }
        self.sink.write_body(buf)
    }

    /// Flush buffered data toward the client, committing the current status
    /// first. No-op when filtered or when the sink cannot flush.
    pub fn flush(&mut self) -> io::Result<()> {
        self.write_status(self.status)?;

        if self.filtered || !self.caps.flush {
            return Ok(());
        }
        if let Some(flushable) = self.sink.as_flushable() {
            flushable.flush()?;
        }
        Ok(())
    }

    /// Take over the raw connection, bypassing the state machine entirely.
    pub fn hijack(&mut self) -> Result<HijackedConn, SinkError> {
        if self.caps.hijack {
            if let Some(hijackable) = self.sink.as_hijackable() {
                return hijackable.hijack();
            }
        }
        Err(SinkError::CapabilityUnsupported {
            sink_type: self.sink_type,
            capability: "hijack",
        })
    }

    /// Client-disconnect notification; never fires when the sink cannot
    /// observe disconnects.
    pub fn disconnect_signal(&self) -> DisconnectSignal {
        match self.sink.as_disconnect_aware() {
            Some(aware) => aware.disconnect_signal(),
            None => DisconnectSignal::never(),
        }
    }
}

/// Append every source value after any the destination already holds.
/// Strictly additive: duplicates are never dropped.
fn merge_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name, value.clone());
    }
}

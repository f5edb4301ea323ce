//! Response sink contract and optional connection capabilities.
//!
//! # Responsibilities
//! - Define the destination contract for headers, status and body bytes
//! - Model the optional behaviors a sink may support as distinct traits
//! - Degrade gracefully when a capability is absent
//!
//! # Design Decisions
//! - Capabilities are separate traits (`Flushable`, `Hijackable`,
//!   `DisconnectAware`) surfaced through probe methods on `ResponseSink`;
//!   the interceptor snapshots them once at wrap time
//! - Hijacking yields the raw connection and abandons HTTP framing; sinks
//!   without that capability fail with a non-retryable error naming the
//!   concrete sink type
//! - A sink that cannot observe client disconnects hands out a signal that
//!   pends forever, mirroring a channel that never fires

use std::io;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;

/// Errors surfaced by sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The wrapped sink does not support the requested capability.
    /// Non-retryable.
    #[error("{sink_type} does not support {capability}")]
    CapabilityUnsupported {
        sink_type: &'static str,
        capability: &'static str,
    },

    /// The underlying connection failed (e.g. client disconnected).
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Destination for a response's headers, status and body bytes: the real
/// client connection or the next layer in a proxy chain.
pub trait ResponseSink {
    /// The sink's own header container.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the sink's own header container.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write the status line. Called at most once per response.
    fn write_status(&mut self, status: StatusCode) -> io::Result<()>;

    /// Write a chunk of body bytes, returning how many were accepted.
    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Concrete type name, used in capability errors.
    fn sink_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Streaming flush support, if any.
    fn as_flushable(&mut self) -> Option<&mut dyn Flushable> {
        None
    }

    /// Raw connection takeover support, if any.
    fn as_hijackable(&mut self) -> Option<&mut dyn Hijackable> {
        None
    }

    /// Client-disconnect notification support, if any.
    fn as_disconnect_aware(&self) -> Option<&dyn DisconnectAware> {
        None
    }
}

/// Synchronous flush of any buffered response data toward the client.
/// Blocks exactly as the underlying sink's flush blocks.
pub trait Flushable {
    fn flush(&mut self) -> io::Result<()>;
}

/// Raw connection takeover. Hijacking abandons HTTP framing entirely.
pub trait Hijackable {
    fn hijack(&mut self) -> Result<HijackedConn, SinkError>;
}

/// Client-disconnect notification.
pub trait DisconnectAware {
    fn disconnect_signal(&self) -> DisconnectSignal;
}

/// Raw byte stream of a hijacked connection.
pub trait RawIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> RawIo for T {}

/// A connection released from HTTP handling.
pub struct HijackedConn {
    /// The raw client connection.
    pub io: Box<dyn RawIo>,
    /// Bytes the server had already read past the request head.
    pub read_buf: Bytes,
}

impl std::fmt::Debug for HijackedConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HijackedConn")
            .field("read_buf", &self.read_buf.len())
            .finish_non_exhaustive()
    }
}

/// Wrap-time snapshot of the optional behaviors a sink supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCapabilities {
    pub flush: bool,
    pub hijack: bool,
    pub disconnect: bool,
}

impl SinkCapabilities {
    /// Probe each capability exactly once.
    pub fn probe<S: ResponseSink + ?Sized>(sink: &mut S) -> Self {
        Self {
            flush: sink.as_flushable().is_some(),
            hijack: sink.as_hijackable().is_some(),
            disconnect: sink.as_disconnect_aware().is_some(),
        }
    }
}

/// Handle that resolves once the client connection has gone away.
#[derive(Debug)]
pub struct DisconnectSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl DisconnectSignal {
    /// Signal backed by a watch channel; resolves when the value turns true.
    pub fn watch(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Signal that never fires, for sinks without disconnect support.
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Wait until the client connection has gone away. Pends forever when
    /// the sink cannot observe disconnects, or when the watching side went
    /// away without ever reporting one.
    pub async fn disconnected(mut self) {
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        std::future::pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_signal_pends() {
        let signal = DisconnectSignal::never();
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.disconnected()).await;
        assert!(waited.is_err(), "signal without backing channel must pend");
    }

    #[tokio::test]
    async fn test_watch_signal_fires_on_disconnect() {
        let (tx, rx) = watch::channel(false);
        let signal = DisconnectSignal::watch(rx);

        let waiter = tokio::spawn(signal.disconnected());
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("signal should fire")
            .unwrap();
    }

    #[tokio::test]
    async fn test_watch_signal_ignores_false_updates() {
        let (tx, rx) = watch::channel(false);
        let signal = DisconnectSignal::watch(rx);

        tx.send(false).unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.disconnected()).await;
        assert!(waited.is_err());
    }
}

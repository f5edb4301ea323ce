//! Error-page interception middleware.
//!
//! # Data Flow
//! ```text
//! request → support gate (GET, no websocket upgrade)
//!     → upstream handler
//!     → Interceptor over a ResponseAssembler
//!         filtered  → substitute page (re-encoded to match, headers fixed)
//!         committed → reattach the streaming body, optionally rewritten
//! ```
//!
//! # Design Decisions
//! - The interception state is built once at startup and shared read-only
//!   across requests; each request gets its own interceptor
//! - Codec failures fall back to forwarding the original bytes unchanged;
//!   a corrupted body is worse than an unrewritten one

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use bytes::Bytes;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue, StatusCode};
use thiserror::Error;

use crate::codec;
use crate::config::schema::InterceptConfig;
use crate::intercept::{Interceptor, RangeParseError, StatusRanges};
use crate::pages;
use crate::rewrite::{gate, RewriteError, RewriteSet};

use super::assembler::ResponseAssembler;

/// Error building the interception state from configuration.
#[derive(Debug, Error)]
pub enum InterceptSetupError {
    #[error(transparent)]
    Ranges(#[from] RangeParseError),

    #[error(transparent)]
    Rewrites(#[from] RewriteError),
}

/// Shared, read-only interception state.
#[derive(Debug, Clone)]
pub struct InterceptState {
    ranges: Arc<StatusRanges>,
    rewrites: Arc<RewriteSet>,
    keep_last_modified: bool,
}

impl InterceptState {
    /// Compile ranges and rewrite rules once. Fails fast so a malformed
    /// configuration never starts serving.
    pub fn from_config(config: &InterceptConfig) -> Result<Self, InterceptSetupError> {
        Ok(Self {
            ranges: Arc::new(StatusRanges::parse(&config.status)?),
            rewrites: Arc::new(RewriteSet::compile(&config.rewrites)?),
            keep_last_modified: config.last_modified,
        })
    }

    pub fn ranges(&self) -> Arc<StatusRanges> {
        self.ranges.clone()
    }
}

/// Axum middleware wrapping the upstream handler with a response
/// interceptor.
pub async fn intercept_errors(
    State(state): State<InterceptState>,
    request: Request,
    next: Next,
) -> Response {
    if !gate::supports_processing(request.method(), request.headers()) {
        // Websocket upgrades and non-GET traffic use the real sink directly.
        return next.run(request).await;
    }

    let upstream = next.run(request).await;
    let (parts, body) = upstream.into_parts();

    let mut interceptor = Interceptor::new(ResponseAssembler::new(), state.ranges());
    for (name, value) in parts.headers.iter() {
        interceptor.headers_mut().append(name, value.clone());
    }
    // ResponseAssembler writes are in-memory and cannot fail.
    let _ = interceptor.write_status(parts.status);

    if interceptor.is_filtered() {
        tracing::debug!(status = %parts.status, "filtered upstream response");
        return state.substitute(interceptor);
    }
    state.pass_through(interceptor, body).await
}

impl InterceptState {
    /// Build the substitute response for a filtered status. The upstream
    /// body never reaches the client; the styled page is written to the
    /// real sink in its place, re-encoded to match the upstream's
    /// Content-Encoding when that encoding is supported.
    fn substitute(&self, mut interceptor: Interceptor<ResponseAssembler>) -> Response {
        let status = interceptor.status();
        let mut headers = interceptor.take_headers();
        let page = pages::error_body(status);

        let encoding = header_str(&headers, &CONTENT_ENCODING).to_string();
        let body = match codec::encode(page.as_bytes(), &encoding) {
            Ok(encoded) => encoded,
            Err(_) => {
                headers.remove(CONTENT_ENCODING);
                page.into_bytes()
            }
        };

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        self.refresh_entity_headers(&mut headers, body.len());

        build_response(status, headers, Body::from(body))
    }

    /// Forward a committed response. Zero buffering unless rewrite rules
    /// exist and the body is eligible.
    async fn pass_through(
        &self,
        interceptor: Interceptor<ResponseAssembler>,
        body: Body,
    ) -> Response {
        let (status, headers, _) = interceptor.into_sink().into_parts();

        if !self.rewrites.is_empty() && gate::supports_rewrite(&headers) {
            return self.rewrite_and_forward(status, headers, body).await;
        }
        build_response(status, headers, body)
    }

    async fn rewrite_and_forward(
        &self,
        status: StatusCode,
        mut headers: HeaderMap,
        body: Body,
    ) -> Response {
        let original = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(error = %err, "failed reading upstream body");
                return build_response(
                    StatusCode::BAD_GATEWAY,
                    HeaderMap::new(),
                    Body::from("upstream body read failed"),
                );
            }
        };

        let encoding = header_str(&headers, &CONTENT_ENCODING).to_string();
        match self.rewrite_bytes(&original, &encoding) {
            Some(rewritten) => {
                self.refresh_entity_headers(&mut headers, rewritten.len());
                build_response(status, headers, Body::from(rewritten))
            }
            // Conservative fallback: original bytes, original headers.
            None => build_response(status, headers, Body::from(original)),
        }
    }

    fn rewrite_bytes(&self, original: &Bytes, encoding: &str) -> Option<Vec<u8>> {
        let raw = match codec::decode(original, encoding) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, encoding, "decode failed; forwarding original body");
                return None;
            }
        };
        let replaced = self.rewrites.apply(&raw);
        match codec::encode(&replaced, encoding) {
            Ok(encoded) => Some(encoded),
            Err(err) => {
                tracing::warn!(error = %err, encoding, "re-encode failed; forwarding original body");
                None
            }
        }
    }

    /// The body changed: Content-Length is recomputed and Last-Modified is
    /// stripped unless configured otherwise.
    fn refresh_entity_headers(&self, headers: &mut HeaderMap, len: usize) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        if !self.keep_last_modified {
            headers.remove(LAST_MODIFIED);
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &http::header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

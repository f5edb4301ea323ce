//! Response-interception middleware for reverse proxies.
//!
//! Watches the status code an upstream handler is about to send and, when it
//! falls inside configured ranges, suppresses the response so a styled error
//! page can be substituted. Everything else passes through unmodified and
//! unbuffered.

pub mod codec;
pub mod config;
pub mod http;
pub mod intercept;
pub mod pages;
pub mod rewrite;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use intercept::{Interceptor, ResponseSink, StatusRanges};

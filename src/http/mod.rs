//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, forwarding to the upstream)
//!     → middleware.rs (support gate, response interception)
//!     → assembler.rs (sink the interceptor commits into)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - The middleware is the "external caller" that owns the substitute
//!   response once a filtered status is caught
//! - Non-filtered bodies are reattached as streams; nothing is buffered
//!   unless rewrite rules are configured and the body is eligible

pub mod assembler;
pub mod middleware;
pub mod server;

pub use assembler::ResponseAssembler;
pub use middleware::{intercept_errors, InterceptSetupError, InterceptState};
pub use server::HttpServer;

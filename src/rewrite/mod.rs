//! Body rewriting and eligibility gates.
//!
//! # Data Flow
//! ```text
//! request  → gate.rs (GET only, no websocket upgrade) → wrap or bypass
//! response → gate.rs (text content, supported encoding, no XSRF cookie)
//!          → rules.rs (compiled regex replacements on the raw body)
//! ```
//!
//! # Design Decisions
//! - Rules compile once at startup; a bad pattern prevents the middleware
//!   from starting
//! - Replacements operate on bytes, not strings: upstream bodies are not
//!   guaranteed to be valid UTF-8

pub mod gate;
pub mod rules;

pub use rules::{RewriteError, RewriteSet};

//! Response interception subsystem.
//!
//! # Data Flow
//! ```text
//! upstream handler
//!     → interceptor.rs (header buffering, one-shot status transition)
//!     → ranges.rs (is this status filtered?)
//!     → sink.rs (real sink contract + optional capabilities)
//!     → client connection
//! ```
//!
//! # Design Decisions
//! - The interceptor never buffers body bytes for non-filtered responses;
//!   pass-through is byte-for-byte and in order
//! - A filtered status freezes the machine: the real sink sees no status,
//!   no headers and no body through this interceptor, and the caller owns
//!   the substitute response
//! - Optional sink capabilities (flush, hijack, disconnect) are probed once
//!   when the sink is wrapped, not on every call

pub mod interceptor;
pub mod ranges;
pub mod sink;

pub use interceptor::Interceptor;
pub use ranges::{RangeParseError, StatusRanges};
pub use sink::{
    DisconnectAware, DisconnectSignal, Flushable, HijackedConn, Hijackable, ResponseSink,
    SinkCapabilities, SinkError,
};

#![forbid(unsafe_code)]

//! Host side of the PageSense bridge.
//!
//! # Role in PageSense
//! The host process reads the content context's console stream as an
//! ordered sequence of text lines, off the critical path of page
//! execution. This crate recognizes frame lines, decodes them under the
//! declared format via `pagesense-core`, and dispatches each recovered
//! signal to the consumer registered for its source.
//!
//! This crate deliberately knows nothing about browsers or wasm — it is
//! plain line-in, signal-out plumbing that any log tap can feed.

pub mod bridge;

pub use bridge::{BridgeError, BridgeStats, LineOutcome, LogBridge, SignalConsumer};

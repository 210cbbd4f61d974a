#![forbid(unsafe_code)]

//! Core: signal model and envelope codec for the PageSense bridge.
//!
//! # Role in PageSense
//! `pagesense-core` is the protocol layer. It owns the [`Signal`] record
//! produced by the in-page observers and the `pagesense-sig-v1` console
//! frame format that carries signals out of the content context.
//!
//! # Primary responsibilities
//! - **Signal**: the atomic captured event (source tag, selector, open
//!   JSON value, millisecond timestamp).
//! - **Envelope codec**: encode a signal into one prefixed console line,
//!   recognize frame lines, and decode payloads with loud, typed errors.
//!
//! # How it fits in the system
//! `pagesense-web` (the content-context producer) encodes through this
//! crate and hands frames to its transport sink; `pagesense-host` (the
//! log consumer) recognizes and decodes frames through the same functions.
//! Keeping both sides on one codec is what makes the wire format a single
//! declared contract instead of a negotiation.

pub mod envelope;
pub mod signal;

pub use envelope::{
    CodecError, FRAME_PREFIX, PROTOCOL_VERSION, decode_line, decode_payload, encode, frame_payload,
};
pub use signal::{Signal, SignalSource, now_ms};

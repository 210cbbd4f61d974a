#![forbid(unsafe_code)]

//! The [`Signal`] record and its source tags.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use web_time::{SystemTime, UNIX_EPOCH};

/// Which observation subsystem produced a signal.
///
/// The wire spellings are `"Fiber"`, `"DOM"`, and `"Network"`. Consumers
/// dispatch on this tag before interpreting [`Signal::value`]; a tag the
/// decoder does not know is a format mismatch, never a guess. Extending
/// the set means adding a variant here on both sides of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalSource {
    /// UI-framework internal-root discovery.
    Fiber,
    /// Observed structural or attribute mutations.
    #[serde(rename = "DOM")]
    Dom,
    /// Reserved for a network observer; no producer in this crate emits it.
    Network,
}

impl SignalSource {
    /// Wire spelling of this tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fiber => "Fiber",
            Self::Dom => "DOM",
            Self::Network => "Network",
        }
    }
}

/// One captured event.
///
/// Immutable once constructed and consumed exactly once by the encoder.
/// `selector` is a source-specific locator (`"root"` for Fiber, the
/// changed element's tag name for DOM) and is not unique within a source.
/// `value` is an open, source-specific record; switch on `source` before
/// reading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub source: SignalSource,
    pub selector: String,
    pub value: Value,
    /// Milliseconds since the Unix epoch, from the emitter's local clock.
    /// Assigned once at emission and never recomputed downstream.
    pub timestamp: u64,
}

impl Signal {
    /// Build a signal with an explicit timestamp.
    #[must_use]
    pub fn new(source: SignalSource, selector: impl Into<String>, value: Value, timestamp: u64) -> Self {
        Self {
            source,
            selector: selector.into(),
            value,
            timestamp,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Uses `web-time`, so the same call works on native targets and on
/// wasm32 inside a page. A clock before the epoch reads as 0.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

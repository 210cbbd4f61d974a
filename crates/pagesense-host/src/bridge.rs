#![forbid(unsafe_code)]

//! The log bridge: line classification, decoding, and dispatch.

use pagesense_core::{CodecError, PROTOCOL_VERSION, Signal, SignalSource, decode_line};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, trace, warn};

/// Receives every decoded signal for one source.
pub trait SignalConsumer {
    fn consume(&mut self, signal: Signal);
}

/// Host-side bridge failure.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A line carried the frame prefix but its payload does not decode
    /// under the declared format — a protocol compatibility bug between
    /// producer and consumer, not a recoverable runtime condition.
    #[error("frame payload does not decode under {PROTOCOL_VERSION}: {0}")]
    FormatMismatch(#[from] CodecError),
}

/// What became of one processed line.
#[derive(Debug)]
pub enum LineOutcome {
    /// No frame prefix; not part of the protocol. Never an error.
    Ignored,
    /// Decoded and delivered to the consumer registered for its source.
    Dispatched(SignalSource),
    /// Decoded, but no consumer is registered for its source.
    Unrouted(SignalSource),
    /// Prefixed line whose payload failed to decode.
    FormatMismatch(BridgeError),
}

/// Counters over every line the bridge has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub ignored: u64,
    pub dispatched: u64,
    pub unrouted: u64,
    pub mismatched: u64,
}

/// Consumes the transport stream line-by-line and dispatches by source.
///
/// No line can wedge the bridge: every failure is contained to the line
/// that produced it, counted, and logged — a format mismatch loudly, a
/// non-frame line silently.
#[derive(Default)]
pub struct LogBridge {
    consumers: HashMap<SignalSource, Box<dyn SignalConsumer>>,
    stats: BridgeStats,
}

impl LogBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the consumer for one source, returning any consumer it
    /// replaced.
    pub fn register(
        &mut self,
        source: SignalSource,
        consumer: Box<dyn SignalConsumer>,
    ) -> Option<Box<dyn SignalConsumer>> {
        self.consumers.insert(source, consumer)
    }

    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Classify and handle one line from the stream.
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        match decode_line(line) {
            None => {
                self.stats.ignored += 1;
                trace!("ignoring non-frame line");
                LineOutcome::Ignored
            }
            Some(Ok(signal)) => {
                let source = signal.source;
                debug!(
                    source = source.as_str(),
                    selector = %signal.selector,
                    timestamp = signal.timestamp,
                    "frame decoded"
                );
                match self.consumers.get_mut(&source) {
                    Some(consumer) => {
                        consumer.consume(signal);
                        self.stats.dispatched += 1;
                        LineOutcome::Dispatched(source)
                    }
                    None => {
                        self.stats.unrouted += 1;
                        warn!(source = source.as_str(), "no consumer registered for source");
                        LineOutcome::Unrouted(source)
                    }
                }
            }
            Some(Err(codec_err)) => {
                let err = BridgeError::from(codec_err);
                self.stats.mismatched += 1;
                error!(%err, "frame rejected");
                LineOutcome::FormatMismatch(err)
            }
        }
    }

    /// Process lines in arrival order.
    pub fn process_stream<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.process_line(line);
        }
    }
}

#![forbid(unsafe_code)]

//! Signal emission: the transport sink seam and the encoding emitter.

use pagesense_core::{Signal, SignalSource, encode, now_ms};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::warn;

/// One-way transport for encoded frames.
///
/// `emit` is synchronous and fire-and-forget: no return value, no
/// acknowledgment, no backpressure. Calls from one execution context are
/// append-only and order-preserving; nothing is promised across contexts
/// sharing the same underlying stream. A sink never reports failure —
/// data loss past this point is invisible to the emitter.
pub trait SignalSink {
    fn emit(&self, frame: &str);
}

/// Bounded in-memory sink for tests and native runs.
///
/// Keeps the newest `capacity` lines, dropping the oldest first — the
/// same best-effort loss the real console transport exhibits when the
/// host is not draining.
pub struct MemorySink {
    lines: RefCell<VecDeque<String>>,
    capacity: usize,
}

impl MemorySink {
    /// Sink holding at most `capacity` lines; zero is clamped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: RefCell::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Snapshot of the buffered lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().iter().cloned().collect()
    }

    /// Remove and return all buffered lines, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.lines.borrow_mut().drain(..).collect()
    }
}

impl SignalSink for MemorySink {
    fn emit(&self, frame: &str) {
        let mut lines = self.lines.borrow_mut();
        if lines.len() >= self.capacity {
            let overflow = lines.len() - self.capacity + 1;
            lines.drain(..overflow);
        }
        lines.push_back(frame.to_string());
    }
}

/// Builds signals, stamps their timestamp, encodes, and hands the frame
/// to the sink.
///
/// A signal that fails to serialize is dropped with a warning; the sink
/// and all later emissions are unaffected. Nothing here panics or throws
/// across the observer callbacks that call it.
#[derive(Clone)]
pub struct Emitter {
    sink: Rc<dyn SignalSink>,
    clock: fn() -> u64,
}

impl Emitter {
    #[must_use]
    pub fn new(sink: Rc<dyn SignalSink>) -> Self {
        Self {
            sink,
            clock: now_ms,
        }
    }

    /// Replace the wall clock, for deterministic tests.
    #[must_use]
    pub fn with_clock(sink: Rc<dyn SignalSink>, clock: fn() -> u64) -> Self {
        Self { sink, clock }
    }

    /// Emit one signal. The timestamp is assigned here, exactly once.
    pub fn emit(&self, source: SignalSource, selector: &str, value: Value) {
        let signal = Signal::new(source, selector, value, (self.clock)());
        match encode(&signal) {
            Ok(frame) => self.sink.emit(&frame),
            Err(err) => {
                warn!(source = source.as_str(), selector, %err, "dropping unencodable signal");
            }
        }
    }
}

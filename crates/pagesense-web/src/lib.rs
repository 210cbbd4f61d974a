#![forbid(unsafe_code)]

//! In-page observation layer for the PageSense bridge.
//!
//! # Role in PageSense
//! `pagesense-web` runs inside the untrusted content context. It owns the
//! two signal producers — a DOM mutation watcher and a periodic
//! UI-framework root scanner — plus the transport sink that carries
//! encoded frames out over the page's console stream.
//!
//! # Primary responsibilities
//! - **Emitter**: stamps timestamps, encodes via `pagesense-core`, and
//!   contains every failure to the single emission that caused it.
//! - **DomWatcher**: one signal per qualifying mutation record, in batch
//!   order; other mutation kinds are deliberately filtered.
//! - **FiberScanner**: fixed-period probe for a framework internal root,
//!   isolated behind the [`fiber::RootLocator`] seam so the heuristic is
//!   swappable.
//! - **Engine lifecycle**: one owned object per page load with explicit
//!   `start`/`shutdown`, holding the subscription and timer handles.
//!
//! # How it fits in the system
//! Everything observable is pure and tested natively; the `wasm` module
//! (wasm32 only) binds the pure pieces to the real DOM via `web-sys` and
//! exports the [`engine`] lifecycle to JavaScript.

pub mod dom;
pub mod emit;
pub mod engine;
pub mod fiber;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use dom::{DomWatcher, MutationKind, RawMutation};
pub use emit::{Emitter, MemorySink, SignalSink};
pub use engine::{DEFAULT_SCAN_PERIOD_MS, EngineConfig, EngineLifecycle, EnginePhase};
pub use fiber::{
    DocumentSnapshot, ElementRecord, FiberScanner, OwnProperty, PrefixRootLocator, RootHandle,
    RootLocator,
};

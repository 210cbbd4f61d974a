#![forbid(unsafe_code)]

//! Browser glue: binds the watcher and scanner to the live DOM and
//! exports the engine to JavaScript.
//!
//! Everything here is thin by design — record conversion, snapshot
//! capture, and resource ownership. The observable behavior (filtering,
//! ordering, heuristics, lifecycle rules) lives in the sibling modules
//! and is tested natively.

use crate::dom::{DomWatcher, RawMutation};
use crate::emit::{Emitter, SignalSink};
use crate::engine::{EngineConfig, EngineLifecycle, EnginePhase};
use crate::fiber::{DocumentSnapshot, ElementRecord, FiberScanner, OwnProperty};
use js_sys::{Array, Object, Reflect};
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, MutationRecord, console};

/// Non-frame line logged once at startup so a human tailing the stream
/// can see the bridge came up. The host decoder ignores it by contract.
const ONLINE_BANNER: &str = "PageSense bridge: online";

/// `NodeFilter.SHOW_ELEMENT` for the snapshot tree walk.
const SHOW_ELEMENT: u32 = 0x1;

/// The real transport: one `console.debug` call per frame.
///
/// Fire-and-forget end of the bridge — whether a host is attached to the
/// console stream is unknowable from here.
pub struct ConsoleSink;

impl SignalSink for ConsoleSink {
    fn emit(&self, frame: &str) {
        console::debug_1(&JsValue::from_str(frame));
    }
}

fn element_record(element: &Element) -> ElementRecord {
    let names = Object::keys(element);
    let mut properties = Vec::with_capacity(names.length() as usize);
    for name_value in names.iter() {
        let Some(name) = name_value.as_string() else {
            continue;
        };
        let root_key = Reflect::get(element, &name_value)
            .ok()
            .filter(JsValue::is_object)
            .and_then(|value| Reflect::get(&value, &JsValue::from_str("key")).ok())
            .and_then(|key| key.as_string());
        properties.push(OwnProperty { name, root_key });
    }
    ElementRecord {
        tag_name: element.tag_name(),
        properties,
    }
}

/// Capture a read-only snapshot of the body's element nodes, in document
/// order. Reads properties only; the walk never mutates the page.
#[must_use]
pub fn snapshot_document(document: &Document) -> DocumentSnapshot {
    let Some(body) = document.body() else {
        return DocumentSnapshot::default();
    };
    let Ok(walker) = document.create_tree_walker_with_what_to_show(&body, SHOW_ELEMENT) else {
        return DocumentSnapshot::default();
    };
    let mut elements = Vec::new();
    while let Ok(Some(node)) = walker.next_node() {
        if let Some(element) = node.dyn_ref::<Element>() {
            elements.push(element_record(element));
        }
    }
    DocumentSnapshot::new(elements)
}

fn raw_mutations(records: &Array) -> Vec<RawMutation> {
    records
        .iter()
        .filter_map(|value| {
            let record = value.dyn_into::<MutationRecord>().ok()?;
            let target = record.target()?;
            let element = target.dyn_ref::<Element>()?;
            Some(RawMutation {
                kind: record.type_(),
                tag_name: element.tag_name(),
                element_id: element.id(),
            })
        })
        .collect()
}

/// The bridge engine, constructed once per page load.
///
/// Owns the mutation subscription, the scan interval, and their
/// callbacks. `start` registers both; `shutdown` releases both and is
/// safe to call from unload handlers any number of times.
#[wasm_bindgen]
pub struct PageSense {
    config: EngineConfig,
    lifecycle: EngineLifecycle,
    watcher: Rc<DomWatcher>,
    scanner: Rc<FiberScanner>,
    observer: Option<MutationObserver>,
    observer_callback: Option<Closure<dyn FnMut(Array, MutationObserver)>>,
    interval_id: Option<i32>,
    interval_callback: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl PageSense {
    /// Engine with the default scan period, emitting on `console.debug`.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> PageSense {
        Self::with_scan_period(EngineConfig::default().scan_period_ms)
    }

    /// Engine with a custom scan period in milliseconds.
    #[wasm_bindgen(js_name = withScanPeriod)]
    #[must_use]
    pub fn with_scan_period(scan_period_ms: u32) -> PageSense {
        let emitter = Emitter::new(Rc::new(ConsoleSink));
        PageSense {
            config: EngineConfig { scan_period_ms },
            lifecycle: EngineLifecycle::new(),
            watcher: Rc::new(DomWatcher::new(emitter.clone())),
            scanner: Rc::new(FiberScanner::new(emitter)),
            observer: None,
            observer_callback: None,
            interval_id: None,
            interval_callback: None,
        }
    }

    /// Current lifecycle phase: `"idle"`, `"running"`, or `"stopped"`.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn phase(&self) -> String {
        self.lifecycle.phase().as_str().to_string()
    }

    /// Register the mutation subscription and the scan timer.
    ///
    /// Errors when called outside the `Idle` phase or when the page has
    /// no window/document/body to observe.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.lifecycle.phase() != EnginePhase::Idle {
            return Err(JsValue::from_str("bridge engine already started"));
        }
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let watcher = self.watcher.clone();
        let observer_callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                watcher.handle_batch(&raw_mutations(&records));
            },
        );
        let observer = MutationObserver::new(observer_callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_attributes(true);
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(&body, &options)?;

        let scanner = self.scanner.clone();
        let interval_callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                scanner.scan(&snapshot_document(&document));
            }
        });
        let interval_id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            interval_callback.as_ref().unchecked_ref(),
            self.config.scan_period_ms as i32,
        )?;

        self.observer = Some(observer);
        self.observer_callback = Some(observer_callback);
        self.interval_id = Some(interval_id);
        self.interval_callback = Some(interval_callback);
        self.lifecycle.start();

        console::log_1(&JsValue::from_str(ONLINE_BANNER));
        Ok(())
    }

    /// Disconnect the observer, clear the timer, and drop both callbacks.
    /// Idempotent; a stopped engine stays stopped.
    pub fn shutdown(&mut self) {
        let transitioned = self.lifecycle.shutdown();
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.observer_callback = None;
        if let Some(id) = self.interval_id.take()
            && let Some(window) = web_sys::window()
        {
            window.clear_interval_with_handle(id);
        }
        self.interval_callback = None;
        if transitioned {
            debug!("bridge engine stopped");
        }
    }
}

impl Default for PageSense {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    // Construction and teardown must not require a window; only `start`
    // touches the page.

    #[wasm_bindgen_test]
    fn engine_constructs_idle() {
        let engine = PageSense::with_scan_period(500);
        assert_eq!(engine.phase(), "idle");
    }

    #[wasm_bindgen_test]
    fn shutdown_without_start_parks_the_engine() {
        let mut engine = PageSense::new();
        engine.shutdown();
        assert_eq!(engine.phase(), "stopped");
        engine.shutdown();
        assert_eq!(engine.phase(), "stopped");
    }
}

#![forbid(unsafe_code)]

//! Periodic heuristic scan for a UI-framework internal root.
//!
//! The heuristic itself sits behind [`RootLocator`], a single-method seam
//! over a read-only [`DocumentSnapshot`], so it can be swapped without
//! touching the emission pipeline. The default [`PrefixRootLocator`]
//! matches own-property names against a fixed set of marker prefixes —
//! the framework object behind the property stays a black box; only its
//! optional `key` leaf is carried out.

use crate::emit::Emitter;
use pagesense_core::SignalSource;
use serde_json::json;
use tracing::debug;

/// Own-property name prefixes that mark a framework-managed element.
pub const DEFAULT_MARKER_PREFIXES: [&str; 2] = ["__reactContainer", "__reactFiber"];

/// One own (expando) property observed on an element, with the `key`
/// leaf of its value when the value is an object that has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnProperty {
    pub name: String,
    pub root_key: Option<String>,
}

/// One element as seen by the scan, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRecord {
    pub tag_name: String,
    pub properties: Vec<OwnProperty>,
}

/// Read-only, document-ordered view of the body's element nodes.
///
/// Capturing a snapshot reads properties and nothing else; the scan never
/// mutates the document it describes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub elements: Vec<ElementRecord>,
}

impl DocumentSnapshot {
    #[must_use]
    pub fn new(elements: Vec<ElementRecord>) -> Self {
        Self { elements }
    }
}

/// A located framework root: just its optional key identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHandle {
    pub key: Option<String>,
}

/// The swappable root-finding heuristic.
pub trait RootLocator {
    /// Find the framework root in a snapshot, or `None` when absent.
    fn find_root(&self, doc: &DocumentSnapshot) -> Option<RootHandle>;
}

/// Default locator: first element in document order exposing an own
/// property whose name starts with one of the marker prefixes.
///
/// Ties between multiple qualifying elements resolve to the first
/// encountered; that choice is not guaranteed stable across document
/// mutations between scans.
pub struct PrefixRootLocator {
    prefixes: Vec<String>,
}

impl PrefixRootLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefixes(DEFAULT_MARKER_PREFIXES.iter().map(|p| p.to_string()))
    }

    /// Locator with custom marker prefixes, for other frameworks.
    #[must_use]
    pub fn with_prefixes(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            prefixes: prefixes.into_iter().collect(),
        }
    }
}

impl Default for PrefixRootLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RootLocator for PrefixRootLocator {
    fn find_root(&self, doc: &DocumentSnapshot) -> Option<RootHandle> {
        for element in &doc.elements {
            for property in &element.properties {
                if self.prefixes.iter().any(|p| property.name.starts_with(p.as_str())) {
                    return Some(RootHandle {
                        key: property.root_key.clone(),
                    });
                }
            }
        }
        None
    }
}

/// Periodically probes a snapshot for the framework root.
///
/// One `Fiber` signal per scan cycle when a root is found; silence when
/// not (there is no explicit negative report). The scan is synchronous
/// and idempotent on the document. Overlapping cycles cannot occur in the
/// single-threaded model and no suppression guard is installed; if the
/// traversal ever becomes asynchronous, this is where one belongs.
pub struct FiberScanner {
    locator: Box<dyn RootLocator>,
    emitter: Emitter,
}

impl FiberScanner {
    /// Scanner with the default prefix heuristic.
    #[must_use]
    pub fn new(emitter: Emitter) -> Self {
        Self::with_locator(emitter, Box::new(PrefixRootLocator::new()))
    }

    #[must_use]
    pub fn with_locator(emitter: Emitter, locator: Box<dyn RootLocator>) -> Self {
        Self { locator, emitter }
    }

    /// Run one scan cycle against a snapshot.
    pub fn scan(&self, doc: &DocumentSnapshot) {
        if let Some(root) = self.locator.find_root(doc) {
            debug!(key = root.key.as_deref().unwrap_or(""), "framework root located");
            self.emitter.emit(
                SignalSource::Fiber,
                "root",
                json!({
                    "status": "found",
                    "key": root.key,
                }),
            );
        }
    }
}

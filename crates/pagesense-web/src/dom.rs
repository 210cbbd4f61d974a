#![forbid(unsafe_code)]

//! DOM mutation watcher: normalized records in, `Dom` signals out.
//!
//! The wasm glue registers one `MutationObserver` over the document body
//! (`{attributes, childList, subtree}`) and forwards each delivered batch
//! here as [`RawMutation`] records. Everything observable about the
//! filtering and emission order lives in this module and runs natively.

use crate::emit::Emitter;
use pagesense_core::SignalSource;
use serde_json::json;
use tracing::trace;

/// The two mutation kinds that produce signals.
///
/// Anything else the change-notification mechanism reports (character
/// data, future kinds) is filtered out on purpose; the filter is part of
/// the contract, not a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
}

impl MutationKind {
    /// Wire spelling used in the signal payload's `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChildList => "childList",
            Self::Attributes => "attributes",
        }
    }

    /// Parse a record-type string as reported by the runtime.
    ///
    /// The match is exact: the DOM spells these `"childList"` and
    /// `"attributes"`, and no other casing reaches a real callback.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "childList" => Some(Self::ChildList),
            "attributes" => Some(Self::Attributes),
            _ => None,
        }
    }
}

/// One mutation record as delivered by the runtime, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMutation {
    /// Record type string (`"childList"`, `"attributes"`, ...).
    pub kind: String,
    /// Tag name of the changed element.
    pub tag_name: String,
    /// `id` attribute of the changed element; empty when unset.
    pub element_id: String,
}

/// Turns mutation batches into `Dom` signals.
pub struct DomWatcher {
    emitter: Emitter,
}

impl DomWatcher {
    #[must_use]
    pub fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }

    /// Process one delivered batch.
    ///
    /// Each qualifying record produces exactly one signal, in the batch's
    /// internal record order. A record that fails to emit affects neither
    /// the rest of the batch nor the subscription.
    pub fn handle_batch(&self, records: &[RawMutation]) {
        for record in records {
            self.handle_record(record);
        }
    }

    fn handle_record(&self, record: &RawMutation) {
        let Some(kind) = MutationKind::parse(&record.kind) else {
            trace!(kind = %record.kind, "skipping non-qualifying mutation kind");
            return;
        };
        self.emitter.emit(
            SignalSource::Dom,
            &record.tag_name,
            json!({
                "type": kind.as_str(),
                "id": record.element_id,
            }),
        );
    }
}

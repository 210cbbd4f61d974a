#![forbid(unsafe_code)]

//! Engine lifecycle: one owned bridge instance per page load.
//!
//! Rather than parking the observer and timer in process-global state and
//! leaning on page teardown to clean up, the wasm glue owns both handles
//! inside a single engine object and drives this state machine: startup
//! happens once, and teardown is an explicit, idempotent operation the
//! host environment can invoke on unload.

/// Period of the root scan, in milliseconds.
pub const DEFAULT_SCAN_PERIOD_MS: u32 = 2000;

/// Engine construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Root-scan period. The frame prefix is a compile-time protocol
    /// constant and is deliberately not configurable here.
    pub scan_period_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_period_ms: DEFAULT_SCAN_PERIOD_MS,
        }
    }
}

/// Lifecycle phases of the bridge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Constructed, observers not yet registered.
    Idle,
    /// Observer subscription and scan timer active.
    Running,
    /// Torn down; a stopped engine does not restart.
    Stopped,
}

impl EnginePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

/// Deterministic start/shutdown transitions, kept separate from the
/// browser resources so the rules are testable natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLifecycle {
    phase: EnginePhase,
}

impl EngineLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: EnginePhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Move to `Running`. Returns `false` (and changes nothing) unless
    /// the engine is `Idle`: an engine is started at most once per page
    /// load and never restarted after shutdown.
    pub fn start(&mut self) -> bool {
        if self.phase == EnginePhase::Idle {
            self.phase = EnginePhase::Running;
            true
        } else {
            false
        }
    }

    /// Move to `Stopped`. Returns `true` only on the transition out of
    /// `Running`; calling again is a no-op, so unload handlers may fire
    /// more than once safely.
    pub fn shutdown(&mut self) -> bool {
        if self.phase == EnginePhase::Running {
            self.phase = EnginePhase::Stopped;
            true
        } else {
            self.phase = EnginePhase::Stopped;
            false
        }
    }
}

impl Default for EngineLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

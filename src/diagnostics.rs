//! Analysis Warnings
//!
//! Soft warnings raised while aggregating footprints (mismatching declared
//! figures, missing declarations). The analysis keeps running with fallback
//! values; warnings are collected here until a handler takes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// A single data-quality warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub title: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisWarning {
    pub fn new(title: impl Into<String>, details: Option<String>) -> Self {
        Self {
            title: title.into(),
            details,
            timestamp: Utc::now(),
        }
    }

    fn same_content(&self, other: &AnalysisWarning) -> bool {
        self.title == other.title && self.details == other.details
    }
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.title, details),
            None => f.write_str(&self.title),
        }
    }
}

/// Receiver of analysis warnings, injected into every carbon tree.
pub trait WarningSink: Send + Sync {
    fn report(&self, warning: AnalysisWarning);
}

type WarningHandler = Box<dyn Fn(&AnalysisWarning) + Send + Sync>;

#[derive(Default)]
struct SinkState {
    pending: Vec<AnalysisWarning>,
    seen: Vec<AnalysisWarning>,
    handler: Option<WarningHandler>,
}

/// Queues warnings until a handler is registered, then forwards them.
pub struct BufferedWarnings {
    state: Mutex<SinkState>,
    dedupe: bool,
}

impl BufferedWarnings {
    /// With `dedupe` a warning identical in title and details to an earlier
    /// one is dropped.
    pub fn new(dedupe: bool) -> Self {
        Self {
            state: Mutex::new(SinkState::default()),
            dedupe,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers the handler and passes every pending warning to it.
    /// Handlers run under the sink's lock and must not report themselves.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&AnalysisWarning) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        if state.handler.is_some() {
            warn!("Analysis warning handler already registered, replacing it");
        }
        for pending in state.pending.drain(..) {
            handler(&pending);
        }
        state.handler = Some(Box::new(handler));
    }

    pub fn clear_handler(&self) {
        self.lock().handler = None;
    }

    /// Warnings not yet taken by a handler.
    pub fn pending(&self) -> Vec<AnalysisWarning> {
        self.lock().pending.clone()
    }

    pub fn drain(&self) -> Vec<AnalysisWarning> {
        std::mem::take(&mut self.lock().pending)
    }

    /// Forget the dedupe history, e.g. when a new analysis starts.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.pending.clear();
        state.seen.clear();
    }
}

impl Default for BufferedWarnings {
    fn default() -> Self {
        Self::new(true)
    }
}

impl WarningSink for BufferedWarnings {
    fn report(&self, warning: AnalysisWarning) {
        let mut state = self.lock();
        if self.dedupe {
            if state.seen.iter().any(|w| w.same_content(&warning)) {
                return;
            }
            state.seen.push(warning.clone());
        }
        warn!(title = %warning.title, details = ?warning.details, "Analysis warning");
        match &state.handler {
            Some(handler) => handler(&warning),
            None => state.pending.push(warning),
        }
    }
}

impl fmt::Debug for BufferedWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("BufferedWarnings")
            .field("pending", &state.pending.len())
            .field("has_handler", &state.handler.is_some())
            .field("dedupe", &self.dedupe)
            .finish()
    }
}

lazy_static::lazy_static! {
    /// Process-wide sink used by trees built without an explicit one.
    pub static ref ANALYSIS_WARNINGS: Arc<BufferedWarnings> = Arc::new(BufferedWarnings::new(true));
}

/// The process-wide sink as a trait object.
pub fn global_sink() -> Arc<dyn WarningSink> {
    ANALYSIS_WARNINGS.clone()
}

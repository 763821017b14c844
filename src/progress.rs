//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as an upload moves through input → gateway → fetch → render →
//! extract. The gateway stage dominates wall-clock time, so a spinner driven
//! by these events is the main feedback a user gets.
//!
//! # Example
//!
//! ```rust
//! use docgrid::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} done in {}ms", stage, elapsed_ms);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     finished: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One step of the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reading or downloading the source file.
    Input,
    /// Submitting the file to the conversion gateway.
    Gateway,
    /// Downloading the converted file when the gateway stored it.
    Fetch,
    /// Rendering the converted file to HTML.
    Render,
    /// Extracting paragraphs and tables from the HTML.
    Extract,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Gateway => "gateway",
            Stage::Fetch => "fetch",
            Stage::Render => "render",
            Stage::Extract => "extract",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: the callback
/// lives in a shared [`crate::ConversionConfig`] and its `Arc` is held across
/// `.await` points, so the conversion future may resume on any worker of a
/// multi-threaded runtime.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first stage.
    fn on_conversion_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails. No further stages run after this.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after extraction succeeded.
    fn on_conversion_complete(&self, element_count: usize) {
        let _ = element_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start:{stage}"));
        }

        fn on_stage_error(&self, stage: Stage, error: &str) {
            self.events.lock().unwrap().push(format!("error:{stage}:{error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start("a.pdf");
        cb.on_stage_start(Stage::Gateway);
        cb.on_stage_complete(Stage::Gateway, 10);
        cb.on_stage_error(Stage::Render, "boom");
        cb.on_conversion_complete(3);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Input);
        rec.on_stage_complete(Stage::Input, 1);
        rec.on_stage_error(Stage::Gateway, "HTTP 500");
        assert_eq!(
            *rec.events.lock().unwrap(),
            vec!["start:input".to_string(), "error:gateway:HTTP 500".to_string()]
        );
    }

    #[test]
    fn stage_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Fetch).unwrap(), "\"fetch\"");
        assert_eq!(Stage::Extract.to_string(), "extract");
    }
}

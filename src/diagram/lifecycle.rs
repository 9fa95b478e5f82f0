use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::DiagramCompileError;

use super::{DiagramCompiler, DiagramSpec, DiagramStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    Idle,
    Compiling { attempt: u64 },
    Rendered { attempt: u64 },
    Failed { attempt: u64, reason: String },
}

/// What the slot's display area currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayContent {
    Empty,
    Diagram(String),
    /// The fixed error placeholder.
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Rendered,
    Failed,
    /// A newer attempt was issued before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug)]
struct SlotState {
    state: DiagramState,
    display: DisplayContent,
    current: Option<DiagramSpec>,
}

/// One diagram display area and the attempts that target it.
///
/// Clones share the same area. Each attempt takes the next sequence number;
/// only the attempt holding the latest number may change the display.
#[derive(Clone)]
pub struct DiagramSlot {
    compiler: Arc<dyn DiagramCompiler>,
    style: Arc<DiagramStyle>,
    timeout: Option<Duration>,
    latest: Arc<AtomicU64>,
    shared: Arc<Mutex<SlotState>>,
}

impl DiagramSlot {
    pub fn new(compiler: Arc<dyn DiagramCompiler>, style: DiagramStyle) -> Self {
        Self {
            compiler,
            style: Arc::new(style),
            timeout: None,
            latest: Arc::new(AtomicU64::new(0)),
            shared: Arc::new(Mutex::new(SlotState {
                state: DiagramState::Idle,
                display: DisplayContent::Empty,
                current: None,
            })),
        }
    }

    /// Bounds each compile; an attempt that runs past it fails.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> DiagramState {
        self.shared.lock().state.clone()
    }

    pub fn display(&self) -> DisplayContent {
        self.shared.lock().display.clone()
    }

    pub fn latest_attempt(&self) -> u64 {
        self.latest.load(AtomicOrdering::Acquire)
    }

    /// Starts a new attempt on a spawned task. Any attempt still in flight is
    /// superseded. Must be called within a tokio runtime.
    pub fn submit(&self, spec: DiagramSpec) -> JoinHandle<AttemptOutcome> {
        let attempt = self.begin(&spec);
        let slot = self.clone();
        tokio::spawn(async move { slot.run(attempt, spec).await })
    }

    /// Like [`submit`](Self::submit), but only when `spec` differs from the
    /// spec of the latest attempt.
    pub fn update(&self, spec: DiagramSpec) -> Option<JoinHandle<AttemptOutcome>> {
        if self.shared.lock().current.as_ref() == Some(&spec) {
            debug!("diagram source and theme unchanged; keeping current attempt");
            return None;
        }
        Some(self.submit(spec))
    }

    /// Runs one attempt on the calling task.
    pub async fn render(&self, spec: DiagramSpec) -> AttemptOutcome {
        let attempt = self.begin(&spec);
        self.run(attempt, spec).await
    }

    /// Returns the slot to `Idle`, clearing the display and superseding any
    /// attempt in flight.
    pub fn reset(&self) {
        let mut shared = self.shared.lock();
        self.latest.fetch_add(1, AtomicOrdering::AcqRel);
        shared.state = DiagramState::Idle;
        shared.display = DisplayContent::Empty;
        shared.current = None;
    }

    fn begin(&self, spec: &DiagramSpec) -> u64 {
        let mut shared = self.shared.lock();
        let attempt = self.latest.fetch_add(1, AtomicOrdering::AcqRel) + 1;
        // Clear before compiling so no stale diagram sits beside the new attempt.
        shared.display = DisplayContent::Empty;
        shared.state = DiagramState::Compiling { attempt };
        shared.current = Some(spec.clone());
        debug!(attempt, theme = spec.theme.tag(), "diagram attempt started");
        attempt
    }

    async fn run(&self, attempt: u64, spec: DiagramSpec) -> AttemptOutcome {
        let compile = self.compiler.compile(&spec.source, spec.theme, &self.style);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, compile)
                .await
                .unwrap_or(Err(DiagramCompileError::Timeout(limit))),
            None => compile.await,
        };
        self.complete(attempt, result)
    }

    fn complete(&self, attempt: u64, result: Result<String, DiagramCompileError>) -> AttemptOutcome {
        let mut shared = self.shared.lock();
        let latest = self.latest.load(AtomicOrdering::Acquire);
        if attempt != latest {
            debug!(attempt, latest, "discarding superseded diagram result");
            return AttemptOutcome::Superseded;
        }
        match result {
            Ok(svg) => {
                shared.display = DisplayContent::Diagram(svg);
                shared.state = DiagramState::Rendered { attempt };
                AttemptOutcome::Rendered
            }
            Err(err) => {
                warn!(attempt, error = %err, "diagram compile failed");
                shared.display = DisplayContent::Placeholder;
                shared.state = DiagramState::Failed {
                    attempt,
                    reason: err.to_string(),
                };
                AttemptOutcome::Failed
            }
        }
    }
}

impl fmt::Debug for DiagramSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramSlot")
            .field("latest", &self.latest_attempt())
            .field("state", &self.state())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::diagram::DiagramTheme;

    struct Echo;

    #[async_trait]
    impl DiagramCompiler for Echo {
        async fn compile(
            &self,
            source: &str,
            _theme: DiagramTheme,
            _style: &DiagramStyle,
        ) -> Result<String, DiagramCompileError> {
            if source.contains("bad") {
                Err(DiagramCompileError::Rejected("parse error".to_string()))
            } else {
                Ok(format!("<svg>{source}</svg>"))
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl DiagramCompiler for Stalled {
        async fn compile(
            &self,
            _source: &str,
            _theme: DiagramTheme,
            _style: &DiagramStyle,
        ) -> Result<String, DiagramCompileError> {
            std::future::pending().await
        }
    }

    fn slot(compiler: impl DiagramCompiler + 'static) -> DiagramSlot {
        DiagramSlot::new(Arc::new(compiler), DiagramStyle::default())
    }

    #[tokio::test]
    async fn starts_idle_and_renders() {
        let slot = slot(Echo);
        assert_eq!(slot.state(), DiagramState::Idle);
        let outcome = slot
            .render(DiagramSpec::new("graph LR", DiagramTheme::Neutral))
            .await;
        assert_eq!(outcome, AttemptOutcome::Rendered);
        assert_eq!(slot.state(), DiagramState::Rendered { attempt: 1 });
        assert_eq!(
            slot.display(),
            DisplayContent::Diagram("<svg>graph LR</svg>".to_string())
        );
    }

    #[tokio::test]
    async fn failure_installs_placeholder() {
        let slot = slot(Echo);
        slot.render(DiagramSpec::new("graph LR", DiagramTheme::Neutral))
            .await;
        let outcome = slot
            .render(DiagramSpec::new("bad graph", DiagramTheme::Neutral))
            .await;
        assert_eq!(outcome, AttemptOutcome::Failed);
        assert_eq!(slot.display(), DisplayContent::Placeholder);
        assert!(matches!(slot.state(), DiagramState::Failed { attempt: 2, ref reason } if reason == "parse error"));
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let slot = slot(Stalled).with_timeout(Some(Duration::from_millis(20)));
        let outcome = slot
            .render(DiagramSpec::new("graph LR", DiagramTheme::Default))
            .await;
        assert_eq!(outcome, AttemptOutcome::Failed);
        assert!(matches!(slot.state(), DiagramState::Failed { ref reason, .. } if reason.contains("timed out")));
    }

    #[tokio::test]
    async fn update_skips_unchanged_spec() {
        let slot = slot(Echo);
        let spec = DiagramSpec::new("graph LR", DiagramTheme::Neutral);
        let first = slot.update(spec.clone()).expect("first update submits");
        assert_eq!(first.await.expect("task joins"), AttemptOutcome::Rendered);
        assert!(slot.update(spec.clone()).is_none());
        let themed = DiagramSpec::new("graph LR", DiagramTheme::Dark);
        let second = slot.update(themed).expect("theme change resubmits");
        assert_eq!(second.await.expect("task joins"), AttemptOutcome::Rendered);
        assert_eq!(slot.latest_attempt(), 2);
    }

    #[tokio::test]
    async fn reset_returns_to_idle() {
        let slot = slot(Echo);
        slot.render(DiagramSpec::new("graph LR", DiagramTheme::Neutral))
            .await;
        slot.reset();
        assert_eq!(slot.state(), DiagramState::Idle);
        assert_eq!(slot.display(), DisplayContent::Empty);
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use slide_schema_renderer::diagram::{
    AttemptOutcome, DiagramCompiler, DiagramSlot, DiagramSpec, DiagramState, DiagramStyle,
    DiagramTheme, DisplayContent,
};
use slide_schema_renderer::error::DiagramCompileError;
use tokio::sync::oneshot;

type Gate = oneshot::Receiver<Result<String, DiagramCompileError>>;

/// Each source blocks until the test releases its result.
#[derive(Default)]
struct GatedCompiler {
    gates: Mutex<HashMap<String, Gate>>,
}

impl GatedCompiler {
    fn gate(&self, source: &str) -> oneshot::Sender<Result<String, DiagramCompileError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(source.to_string(), rx);
        tx
    }
}

#[async_trait]
impl DiagramCompiler for GatedCompiler {
    async fn compile(
        &self,
        source: &str,
        _theme: DiagramTheme,
        _style: &DiagramStyle,
    ) -> Result<String, DiagramCompileError> {
        let gate = self.gates.lock().unwrap().remove(source);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(DiagramCompileError::Aborted("gate dropped".into()))),
            None => Ok(format!("<svg>{source}</svg>")),
        }
    }
}

fn setup() -> (Arc<GatedCompiler>, DiagramSlot) {
    let compiler = Arc::new(GatedCompiler::default());
    let slot = DiagramSlot::new(compiler.clone(), DiagramStyle::default());
    (compiler, slot)
}

fn spec(source: &str) -> DiagramSpec {
    DiagramSpec::new(source, DiagramTheme::Neutral)
}

#[tokio::test]
async fn late_result_of_older_attempt_is_discarded() {
    let (compiler, slot) = setup();
    let first = compiler.gate("graph LR; A-->B");
    let second = compiler.gate("graph LR; B-->C");

    let older = slot.submit(spec("graph LR; A-->B"));
    let newer = slot.submit(spec("graph LR; B-->C"));
    assert_eq!(slot.latest_attempt(), 2);

    second.send(Ok("<svg>newer</svg>".into())).unwrap();
    assert_eq!(newer.await.unwrap(), AttemptOutcome::Rendered);

    first.send(Ok("<svg>older</svg>".into())).unwrap();
    assert_eq!(older.await.unwrap(), AttemptOutcome::Superseded);

    assert_eq!(slot.display(), DisplayContent::Diagram("<svg>newer</svg>".into()));
    assert_eq!(slot.state(), DiagramState::Rendered { attempt: 2 });
}

#[tokio::test]
async fn older_success_cannot_hide_newer_failure() {
    let (compiler, slot) = setup();
    let first = compiler.gate("graph TD; ok");
    let second = compiler.gate("graph TD; broken");

    let older = slot.submit(spec("graph TD; ok"));
    let newer = slot.submit(spec("graph TD; broken"));

    second
        .send(Err(DiagramCompileError::Rejected("Parse error on line 1".into())))
        .unwrap();
    assert_eq!(newer.await.unwrap(), AttemptOutcome::Failed);

    first.send(Ok("<svg>ok</svg>".into())).unwrap();
    assert_eq!(older.await.unwrap(), AttemptOutcome::Superseded);

    assert_eq!(slot.display(), DisplayContent::Placeholder);
    assert!(matches!(
        slot.state(),
        DiagramState::Failed { attempt: 2, ref reason } if reason.contains("Parse error")
    ));
}

#[tokio::test]
async fn new_attempt_clears_previous_diagram_until_it_resolves() {
    let (compiler, slot) = setup();
    assert_eq!(slot.render(spec("graph LR; A")).await, AttemptOutcome::Rendered);
    assert_eq!(slot.display(), DisplayContent::Diagram("<svg>graph LR; A</svg>".into()));

    let gate = compiler.gate("graph LR; B");
    let pending = slot.submit(spec("graph LR; B"));
    assert_eq!(slot.display(), DisplayContent::Empty);
    assert_eq!(slot.state(), DiagramState::Compiling { attempt: 2 });

    gate.send(Err(DiagramCompileError::EmptyOutput)).unwrap();
    assert_eq!(pending.await.unwrap(), AttemptOutcome::Failed);
    assert_eq!(slot.display(), DisplayContent::Placeholder);
}

#[tokio::test]
async fn reset_supersedes_in_flight_attempt() {
    let (compiler, slot) = setup();
    let gate = compiler.gate("pie title Pets");
    let pending = slot.submit(spec("pie title Pets"));

    slot.reset();
    gate.send(Ok("<svg>pie</svg>".into())).unwrap();
    assert_eq!(pending.await.unwrap(), AttemptOutcome::Superseded);
    assert_eq!(slot.state(), DiagramState::Idle);
    assert_eq!(slot.display(), DisplayContent::Empty);
}

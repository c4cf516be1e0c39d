use crate::error::Result;
use crate::line_editor::{LineAction, LineEditor, ERASE_SEQUENCE};
use crate::surface::{Surface, ViewportSize};
use crate::viewport::{LifecycleState, ViewportController};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;
use wasmide_core::config::{ResultOrder, TerminalConfig};
use wasmide_core::{Command, ExecutionRecord, ProjectId};
use wasmide_remote::CommandDispatcher;

/// Finished dispatches, in completion order.
pub type DispatchReceiver = mpsc::UnboundedReceiver<ExecutionRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub prompt: String,
    pub result_order: ResultOrder,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            result_order: ResultOrder::Arrival,
        }
    }
}

impl From<&TerminalConfig> for SessionOptions {
    fn from(config: &TerminalConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            result_order: config.result_order,
        }
    }
}

/// One interactive terminal bound to a project.
///
/// Keystrokes are handled synchronously. Each submitted line is dispatched on
/// its own task; finished records come back through the [`DispatchReceiver`]
/// returned by [`new`](Self::new) and are handed to
/// [`render_result`](Self::render_result) by the owner's event loop.
pub struct TerminalSession<S: Surface> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    project: ProjectId,
    options: SessionOptions,
    editor: LineEditor,
    viewport: ViewportController<S>,
    dispatcher: Arc<dyn CommandDispatcher>,
    results_tx: mpsc::UnboundedSender<ExecutionRecord>,
    next_seq: u64,
    next_render: u64,
    held: BTreeMap<u64, ExecutionRecord>,
}

impl<S: Surface> TerminalSession<S> {
    pub fn new(
        project: ProjectId,
        dispatcher: Arc<dyn CommandDispatcher>,
        options: SessionOptions,
    ) -> (Self, DispatchReceiver) {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            project,
            options,
            editor: LineEditor::new(),
            viewport: ViewportController::new(),
            dispatcher,
            results_tx,
            next_seq: 0,
            next_render: 0,
            held: BTreeMap::new(),
        };
        (session, results_rx)
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn state(&self) -> LifecycleState {
        self.viewport.state()
    }

    /// Text typed since the last submit.
    pub fn buffer(&self) -> &str {
        self.editor.buffer()
    }

    /// Results waiting for an earlier submission to finish first.
    pub fn held_results(&self) -> usize {
        self.held.len()
    }

    /// Attach the viewport and show the first prompt.
    pub fn attach(&mut self, surface: S, container: watch::Receiver<ViewportSize>) -> Result<()> {
        self.viewport.attach(surface, container)?;
        info!("Session {} attached for project {}", self.id, self.project);
        self.viewport.echo(&self.options.prompt)
    }

    /// Feed raw input, one char per input unit. Returns the commands this call
    /// dispatched, in submission order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle_input(&mut self, data: &str) -> Result<Vec<Command>> {
        self.viewport.ensure_attached()?;

        let mut dispatched = Vec::new();
        for unit in data.chars() {
            match self.editor.feed(unit) {
                LineAction::Echo(c) => {
                    let mut buf = [0u8; 4];
                    self.viewport.echo(c.encode_utf8(&mut buf))?;
                }
                LineAction::Erase => self.viewport.echo(ERASE_SEQUENCE)?,
                LineAction::Reprompt => {
                    self.viewport.echo("\r\n")?;
                    self.viewport.echo(&self.options.prompt)?;
                }
                LineAction::Submit(line) => {
                    self.viewport.write_line("")?;
                    if let Some(command) = Command::new(&line, &self.project) {
                        self.dispatch(command.clone());
                        dispatched.push(command);
                    }
                }
                LineAction::Noop => {}
            }
        }
        Ok(dispatched)
    }

    fn dispatch(&mut self, command: Command) {
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(
            "Submitting #{} {:?} at {}",
            seq,
            command.text(),
            command.submitted_at()
        );

        let mut record = ExecutionRecord::new(seq, command);
        let dispatcher = self.dispatcher.clone();
        let results_tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = dispatcher.dispatch(&record.command).await;
            record.finish(result);
            // A closed channel means the session is gone; nothing left to render.
            let _ = results_tx.send(record);
        });
    }

    /// Show a finished dispatch, honouring the configured ordering.
    pub fn render_result(&mut self, record: ExecutionRecord) -> Result<()> {
        self.viewport.ensure_attached()?;

        match self.options.result_order {
            ResultOrder::Arrival => self.write_result(&record),
            ResultOrder::Submission => {
                self.held.insert(record.seq, record);
                while let Some(record) = self.held.remove(&self.next_render) {
                    self.write_result(&record)?;
                    self.next_render += 1;
                }
                Ok(())
            }
        }
    }

    fn write_result(&mut self, record: &ExecutionRecord) -> Result<()> {
        let text = record
            .result
            .as_ref()
            .map(|r| r.transcript_text())
            .unwrap_or_default();

        if record.succeeded() {
            info!(
                "Command #{} finished in {:.2}s",
                record.seq,
                record.duration_secs().unwrap_or_default()
            );
        } else {
            warn!("Command #{} failed: {}", record.seq, text);
        }

        let text = text.trim_end_matches(['\r', '\n']);
        self.viewport.write_line(&format!("\r\n{}", text))?;
        self.viewport.echo(&self.options.prompt)
    }

    pub fn on_resize(&mut self) -> Result<()> {
        self.viewport.on_resize()
    }

    pub fn dispose(&mut self) {
        if !self.held.is_empty() {
            debug!("Dropping {} held results", self.held.len());
            self.held.clear();
        }
        self.viewport.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerminalError;
    use crate::surface::{Transcript, TranscriptSurface};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tokio::sync::oneshot;
    use wasmide_core::ExecutionResult;

    /// Answers held back until the test releases them; anything unscripted
    /// succeeds immediately.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<HashMap<String, oneshot::Receiver<ExecutionResult>>>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn hold(&self, text: &str) -> oneshot::Sender<ExecutionResult> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().insert(text.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl CommandDispatcher for Scripted {
        async fn dispatch(&self, command: &Command) -> ExecutionResult {
            self.seen.lock().push(command.text().to_string());
            let reply = self.replies.lock().remove(command.text());
            match reply {
                Some(rx) => rx.await.unwrap_or(ExecutionResult::TransportError {
                    message: "dropped".to_string(),
                }),
                None => ExecutionResult::Success {
                    output: format!("ran {}", command.text()),
                },
            }
        }
    }

    struct Harness {
        session: TerminalSession<TranscriptSurface>,
        results: DispatchReceiver,
        transcript: Arc<Mutex<Transcript>>,
        _container: watch::Sender<ViewportSize>,
    }

    fn harness(dispatcher: Arc<Scripted>, result_order: ResultOrder) -> Harness {
        let options = SessionOptions {
            result_order,
            ..Default::default()
        };
        let (mut session, results) =
            TerminalSession::new(ProjectId::new("p1").unwrap(), dispatcher, options);
        let surface = TranscriptSurface::new(1000);
        let transcript = surface.handle();
        let (container, rx) = watch::channel(ViewportSize::default());
        session.attach(surface, rx).unwrap();
        Harness {
            session,
            results,
            transcript,
            _container: container,
        }
    }

    fn ok(output: &str) -> ExecutionResult {
        ExecutionResult::Success {
            output: output.to_string(),
        }
    }

    #[tokio::test]
    async fn test_attach_shows_prompt() {
        let h = harness(Arc::new(Scripted::default()), ResultOrder::Arrival);
        assert_eq!(h.transcript.lock().current_line(), "$ ");
        assert_eq!(h.session.state(), LifecycleState::Attached);
    }

    #[tokio::test]
    async fn test_input_before_attach_fails() {
        let (mut session, _results) = TerminalSession::<TranscriptSurface>::new(
            ProjectId::default(),
            Arc::new(Scripted::default()),
            SessionOptions::default(),
        );
        assert!(matches!(
            session.handle_input("ls"),
            Err(TerminalError::NotAttached)
        ));
    }

    #[tokio::test]
    async fn test_typing_echoes_each_char() {
        let mut h = harness(Arc::new(Scripted::default()), ResultOrder::Arrival);
        let dispatched = h.session.handle_input("lx\x7fs").unwrap();
        assert!(dispatched.is_empty());
        assert_eq!(h.session.buffer(), "ls");
        assert_eq!(h.transcript.lock().current_line(), "$ ls");
    }

    #[tokio::test]
    async fn test_erase_on_empty_buffer_changes_nothing() {
        let mut h = harness(Arc::new(Scripted::default()), ResultOrder::Arrival);
        h.session.handle_input("\x7f\x7f").unwrap();
        assert_eq!(h.session.buffer(), "");
        assert_eq!(h.transcript.lock().current_line(), "$ ");
    }

    #[tokio::test]
    async fn test_blank_submit_dispatches_nothing() {
        let script = Arc::new(Scripted::default());
        let mut h = harness(script.clone(), ResultOrder::Arrival);

        let dispatched = h.session.handle_input("   \r").unwrap();
        tokio::task::yield_now().await;

        assert!(dispatched.is_empty());
        assert!(script.seen.lock().is_empty());
        assert_eq!(h.session.buffer(), "");
        assert_eq!(h.transcript.lock().current_line(), "$ ");
        assert!(h.results.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_dispatches_one_command() {
        let script = Arc::new(Scripted::default());
        let mut h = harness(script.clone(), ResultOrder::Arrival);

        let dispatched = h.session.handle_input("ls\r").unwrap();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].text(), "ls");
        assert_eq!(dispatched[0].project().as_str(), "p1");
        assert_eq!(h.session.buffer(), "");

        let record = h.results.recv().await.unwrap();
        assert_eq!(record.command.id(), dispatched[0].id());
        assert!(record.succeeded());
        h.session.render_result(record).unwrap();

        assert_eq!(script.seen.lock().as_slice(), ["ls".to_string()]);
        assert_eq!(
            h.transcript.lock().lines(),
            vec!["$ ls", "", "ran ls", "$"]
        );
        assert_eq!(h.transcript.lock().current_line(), "$ ");
    }

    #[tokio::test]
    async fn test_backend_failure_renders_error_and_prompt() {
        let script = Arc::new(Scripted::default());
        let reply = script.hold("rm -rf /");
        let mut h = harness(script, ResultOrder::Arrival);

        h.session.handle_input("rm -rf /\r").unwrap();
        reply
            .send(ExecutionResult::Failure {
                error: "permission denied".to_string(),
            })
            .unwrap();
        let record = h.results.recv().await.unwrap();
        assert!(!record.succeeded());
        h.session.render_result(record).unwrap();

        let transcript = h.transcript.lock();
        assert!(transcript
            .lines()
            .contains(&"Error: permission denied".to_string()));
        assert_eq!(transcript.current_line(), "$ ");
        assert_eq!(h.session.buffer(), "");
    }

    #[tokio::test]
    async fn test_results_render_in_arrival_order() {
        let script = Arc::new(Scripted::default());
        let first = script.hold("a");
        let second = script.hold("b");
        let mut h = harness(script, ResultOrder::Arrival);

        let dispatched = h.session.handle_input("a\rb\r").unwrap();
        assert_eq!(dispatched.len(), 2);

        second.send(ok("out-b")).unwrap();
        let record = h.results.recv().await.unwrap();
        assert_eq!(record.seq, 1);
        h.session.render_result(record).unwrap();

        first.send(ok("out-a")).unwrap();
        let record = h.results.recv().await.unwrap();
        assert_eq!(record.seq, 0);
        h.session.render_result(record).unwrap();

        let contents = h.transcript.lock().contents();
        let b = contents.find("out-b").unwrap();
        let a = contents.find("out-a").unwrap();
        assert!(b < a);
        assert!(!contents.contains("Error:"));
    }

    #[tokio::test]
    async fn test_results_render_in_submission_order() {
        let script = Arc::new(Scripted::default());
        let first = script.hold("a");
        let second = script.hold("b");
        let mut h = harness(script, ResultOrder::Submission);

        h.session.handle_input("a\rb\r").unwrap();

        second.send(ok("out-b")).unwrap();
        let record = h.results.recv().await.unwrap();
        h.session.render_result(record).unwrap();
        assert_eq!(h.session.held_results(), 1);
        assert!(!h.transcript.lock().contents().contains("out-b"));

        first.send(ok("out-a")).unwrap();
        let record = h.results.recv().await.unwrap();
        h.session.render_result(record).unwrap();
        assert_eq!(h.session.held_results(), 0);

        let contents = h.transcript.lock().contents();
        let a = contents.find("out-a").unwrap();
        let b = contents.find("out-b").unwrap();
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_trailing_newlines_are_trimmed() {
        let script = Arc::new(Scripted::default());
        let reply = script.hold("ls");
        let mut h = harness(script, ResultOrder::Arrival);

        h.session.handle_input("ls\r").unwrap();
        reply.send(ok("a.txt\nb.txt\n\n")).unwrap();
        let record = h.results.recv().await.unwrap();
        h.session.render_result(record).unwrap();

        assert_eq!(
            h.transcript.lock().lines(),
            vec!["$ ls", "", "a.txt", "b.txt", "$"]
        );
    }

    #[tokio::test]
    async fn test_result_after_dispose_is_dropped() {
        let mut h = harness(Arc::new(Scripted::default()), ResultOrder::Arrival);
        h.session.handle_input("ls\r").unwrap();
        let record = h.results.recv().await.unwrap();

        h.session.dispose();
        assert_eq!(h.session.state(), LifecycleState::Disposed);
        assert!(matches!(
            h.session.render_result(record),
            Err(TerminalError::Disposed)
        ));
        assert!(h.transcript.lock().is_released());
    }

    #[tokio::test]
    async fn test_options_from_config() {
        let config = TerminalConfig {
            prompt: "> ".to_string(),
            result_order: ResultOrder::Submission,
            ..Default::default()
        };
        let options = SessionOptions::from(&config);
        assert_eq!(options.prompt, "> ");
        assert_eq!(options.result_order, ResultOrder::Submission);
    }
}

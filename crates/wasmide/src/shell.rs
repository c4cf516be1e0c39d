use anyhow::{Context, Result};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use std::io;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use wasmide_core::config::AppConfig;
use wasmide_core::ProjectId;
use wasmide_remote::HttpDispatcher;
use wasmide_terminal::keys::{self, KeyInput};
use wasmide_terminal::{SessionOptions, StdoutSurface, TerminalSession, ViewportSize};

/// Raw mode plus bracketed paste for as long as the guard lives.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(io::stdout(), EnableBracketedPaste).context("failed to enable bracketed paste")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste);
        let _ = disable_raw_mode();
    }
}

/// Run the interactive shell until Ctrl-C, Ctrl-D or the end of input.
pub async fn run(config: &AppConfig, project: ProjectId) -> Result<()> {
    let dispatcher = HttpDispatcher::from_config(&config.backend)
        .context("invalid execution backend configuration")?;
    info!(
        "Shell for project {} via {}/{}",
        project,
        config.backend.execute_url,
        dispatcher.endpoint().path()
    );

    let (mut session, mut results) = TerminalSession::new(
        project,
        Arc::new(dispatcher),
        SessionOptions::from(&config.terminal),
    );

    let (cols, rows) = terminal::size().context("failed to query terminal size")?;
    let (container, container_rx) = watch::channel(ViewportSize::new(cols, rows));

    let guard = RawModeGuard::enable()?;
    session.attach(StdoutSurface::stdout(config.terminal.convert_eol), container_rx)?;

    let mut events = EventStream::new();
    let outcome: Result<()> = loop {
        tokio::select! {
            Some(record) = results.recv() => {
                if let Err(e) = session.render_result(record) {
                    warn!("Dropped result: {}", e);
                }
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => match keys::translate(&key) {
                    KeyInput::Unit(unit) => {
                        let mut buf = [0u8; 4];
                        if let Err(e) = session.handle_input(unit.encode_utf8(&mut buf)) {
                            break Err(e.into());
                        }
                    }
                    KeyInput::Quit => break Ok(()),
                    KeyInput::Ignored => {}
                },
                Some(Ok(Event::Paste(text))) => {
                    // Pasted line breaks submit, like typed Enter.
                    let text = text.replace("\r\n", "\r").replace('\n', "\r");
                    if let Err(e) = session.handle_input(&text) {
                        break Err(e.into());
                    }
                }
                Some(Ok(Event::Resize(cols, rows))) => {
                    container.send_replace(ViewportSize::new(cols, rows));
                    if let Err(e) = session.on_resize() {
                        break Err(e.into());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(anyhow::Error::from(e).context("failed to read terminal input")),
                None => break Ok(()),
            }
        }
    };

    session.dispose();
    drop(guard);
    println!();
    info!("Shell closed");
    outcome
}

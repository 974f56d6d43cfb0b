//! Terminal setup and the event loop.
//!
//! The loop redraws, then waits for whichever comes first: a terminal
//! event, a finished backend command, or the idle tick. Commands run as
//! spawned tasks on the same single-threaded runtime and report back over
//! an unbounded channel, so outcomes are applied in completion order.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use dbstudio_client::api::BackendApi;

use crate::config::StudioConfig;
use crate::effects::{self, Command, Outcome};
use crate::error::StudioError;
use crate::storage::LocalStorage;
use crate::ui::App;

type StudioTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Puts the terminal back on drop: raw mode off, main screen, no mouse
/// capture. Also runs when the loop panics or returns early.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<(Self, StudioTerminal), StudioError> {
        enable_raw_mode().map_err(terminal_error)?;
        let guard = TerminalGuard;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(terminal_error)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(terminal_error)?;
        Ok((guard, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

fn terminal_error(e: io::Error) -> StudioError {
    StudioError::Terminal(e.to_string())
}

/// Run the studio until the user quits.
pub async fn run(config: StudioConfig) -> Result<(), StudioError> {
    let storage = LocalStorage::open(&config.state_file)?;
    let api = BackendApi::new(config.backend_url.clone());
    let mut app = App::new(storage);

    tracing::info!(
        backend = %config.backend_url,
        state_file = %config.state_file.display(),
        "Starting studio"
    );

    let (_guard, mut terminal) = TerminalGuard::enter()?;
    let result = event_loop(&mut terminal, &mut app, &api, config.tick).await;
    app.quit();
    let _ = terminal.show_cursor();

    match &result {
        Ok(()) => tracing::info!("Studio closed"),
        Err(e) => tracing::error!(error = %e, "Studio stopped"),
    }
    result
}

async fn event_loop(
    terminal: &mut StudioTerminal,
    app: &mut App,
    api: &BackendApi,
    tick: Duration,
) -> Result<(), StudioError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick);

    while !app.should_quit() {
        terminal
            .draw(|frame| app.render(frame))
            .map_err(terminal_error)?;

        let commands = tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => app.handle_event(&event),
                Some(Err(e)) => return Err(terminal_error(e)),
                None => break,
            },
            Some(outcome) = rx.recv() => app.apply_outcome(outcome),
            _ = ticker.tick() => Vec::new(),
        };

        for command in commands {
            spawn_command(api, &tx, command);
        }
    }
    Ok(())
}

fn spawn_command(api: &BackendApi, tx: &mpsc::UnboundedSender<Outcome>, command: Command) {
    tracing::debug!(?command, "Dispatching command");
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = effects::perform(&api, command).await;
        if tx.send(outcome).is_err() {
            tracing::debug!("Event loop closed before the outcome arrived");
        }
    });
}

pub mod events;
pub mod state;
pub mod ui;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::MailboxApi;
use crate::terminal::state::AppState;
use crate::views::AgentSettings;
use crate::worker::Dispatcher;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_tui(api: Arc<dyn MailboxApi>, settings: AgentSettings) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("{e}"))?;

    let dispatcher = Dispatcher::new(api);
    let mut state = AppState::new(settings);

    let terminal = ratatui::try_init()?;
    let result = run(terminal, &mut state, &dispatcher);
    ratatui::restore();

    result
}

fn run(mut terminal: DefaultTerminal, state: &mut AppState, dispatcher: &Dispatcher) -> Result<()> {
    loop {
        for req in state.outbox.drain() {
            dispatcher.spawn(req);
        }
        for done in dispatcher.completed() {
            state.apply(done);
        }
        state.tick(Instant::now());

        terminal.draw(|f| ui::render(f, state))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && events::handle_key(key, state)
        {
            break;
        }
    }
    Ok(())
}

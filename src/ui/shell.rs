use anyhow::Result;

use crate::usecases::{
    context::AppContext,
    contracts::{AppEventSource, ShellOrchestrator},
};

use super::{terminal::TerminalSession, view};

const SHELL_STARTED: &str = "SHELL_STARTED";
const SHELL_STOPPED: &str = "SHELL_STOPPED";

pub fn start(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    tracing::info!(
        code = SHELL_STARTED,
        api_base = %context.config.api.base_url,
        poll_interval_ms = context.config.chat.poll_interval_ms,
        "starting chat shell"
    );

    let mut terminal = TerminalSession::enter()?;
    run_loop(event_source, orchestrator, |orchestrator| {
        let email = orchestrator.current_email();
        terminal.draw(|frame| view::render(frame, orchestrator.widget(), email.as_deref()))
    })?;

    tracing::info!(code = SHELL_STOPPED, "chat shell stopped");
    Ok(())
}

/// Draw, wait for one event, apply it; until the orchestrator stops. An
/// exhausted source also ends the loop.
fn run_loop<D>(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
    mut draw: D,
) -> Result<()>
where
    D: FnMut(&dyn ShellOrchestrator) -> Result<()>,
{
    while orchestrator.is_running() {
        draw(&*orchestrator)?;

        match event_source.next_event()? {
            Some(event) => orchestrator.handle_event(event)?,
            None if event_source.is_exhausted() => break,
            None => {}
        }
    }

    Ok(())
}

use anyhow::Result;
use tokio::runtime::Handle;

use crate::domain::{
    events::{AppEvent, Key, KeyInput},
    message_input_state::MessageInputState,
    widget_state::{WidgetState, WidgetView},
};

use super::{
    chat_widget::ChatWidget,
    contracts::{ChatBackend, ShellOrchestrator},
};

/// Drives the chat widget from terminal events. Widget actions are async; the
/// UI thread blocks on each one, so actions never overlap.
pub struct ChatShellOrchestrator<A: ChatBackend> {
    widget: ChatWidget<A>,
    runtime: Handle,
    running: bool,
}

impl<A: ChatBackend> ChatShellOrchestrator<A> {
    pub fn new(widget: ChatWidget<A>, runtime: Handle) -> Self {
        Self {
            widget,
            runtime,
            running: true,
        }
    }

    fn stop(&mut self) {
        self.widget.close_widget();
        self.running = false;
    }

    fn handle_key(&mut self, input: KeyInput) {
        if input.ctrl {
            if input.key == Key::Char('r') {
                self.runtime.block_on(self.widget.refresh_conversations());
            }
            return;
        }

        match self.widget.state().view() {
            WidgetView::Closed => self.handle_closed_key(input.key),
            WidgetView::List if self.widget.state().login_required() => {
                if matches!(input.key, Key::Esc | Key::Char('q')) {
                    self.widget.close_widget();
                }
            }
            WidgetView::List if self.widget.state().compose().is_active() => {
                self.handle_compose_key(input.key)
            }
            WidgetView::List => self.handle_list_key(input.key),
            WidgetView::Thread => self.handle_thread_key(input.key),
        }
    }

    fn handle_closed_key(&mut self, key: Key) {
        match key {
            Key::Enter | Key::Char('o') | Key::Char('m') => {
                self.runtime.block_on(self.widget.open_widget())
            }
            Key::Char('q') => self.stop(),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: Key) {
        match key {
            Key::Up | Key::Char('k') => {
                self.widget.state_mut().conversations_mut().select_previous()
            }
            Key::Down | Key::Char('j') => self.widget.state_mut().conversations_mut().select_next(),
            Key::Enter => self.runtime.block_on(self.widget.open_selected()),
            Key::Char('n') => self.widget.begin_compose(),
            Key::Char('r') => self.runtime.block_on(self.widget.refresh_conversations()),
            Key::Esc => self.widget.close_widget(),
            Key::Char('q') => self.stop(),
            _ => {}
        }
    }

    fn handle_compose_key(&mut self, key: Key) {
        match key {
            Key::Esc => self.widget.cancel_compose(),
            Key::Tab => self.widget.state_mut().compose_mut().toggle_focus(),
            Key::Enter => self.runtime.block_on(self.widget.start_new_chat()),
            other => edit(self.widget.state_mut().compose_mut().focused_input_mut(), other),
        }
    }

    fn handle_thread_key(&mut self, key: Key) {
        match key {
            Key::Esc => self.widget.back_to_list(),
            Key::Enter => self.runtime.block_on(self.widget.send_message()),
            Key::Up => self.widget.state_mut().thread_mut().scroll_up(),
            Key::Down => self.widget.state_mut().thread_mut().scroll_down(),
            other => edit(self.widget.state_mut().input_mut(), other),
        }
    }
}

fn edit(input: &mut MessageInputState, key: Key) {
    match key {
        Key::Char(ch) => {
            input.insert_char(ch);
        }
        Key::Backspace => input.delete_char_before(),
        Key::Delete => input.delete_char_at(),
        Key::Left => input.move_cursor_left(),
        Key::Right => input.move_cursor_right(),
        Key::Home => input.move_cursor_home(),
        Key::End => input.move_cursor_end(),
        Key::Enter | Key::Esc | Key::Tab | Key::Up | Key::Down => {}
    }
}

impl<A: ChatBackend> ShellOrchestrator for ChatShellOrchestrator<A> {
    fn is_running(&self) -> bool {
        self.running
    }

    fn widget(&self) -> &WidgetState {
        self.widget.state()
    }

    fn current_email(&self) -> Option<String> {
        self.widget.current_email()
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => {
                self.widget.apply_pending_refreshes();
            }
            AppEvent::QuitRequested => self.stop(),
            AppEvent::InputKey(input) => self.handle_key(input),
        }

        Ok(())
    }
}

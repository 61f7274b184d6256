use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{
    compose_state::ComposeField,
    conversation::ConversationSummary,
    conversation_list_state::ConversationListUiState,
    thread_state::ThreadUiState,
    widget_state::{WidgetState, WidgetView},
};

use super::{
    message_input::{render_input, InputField},
    message_rendering::{build_thread_lines, format_time},
    styles,
};

const APP_TITLE: &str = "GatorKeys";
const LOGIN_PROMPT: &str =
    "Log in to message other students.\nRun `gatorkeys login` in another terminal, then reopen.";
const ELLIPSIS: char = '…';

pub fn render(frame: &mut Frame<'_>, widget: &WidgetState, current_email: Option<&str>) {
    let [header_area, body_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    frame.render_widget(Paragraph::new(header_line(current_email)), header_area);

    match widget.view() {
        WidgetView::Closed => render_closed(frame, body_area, widget),
        WidgetView::List | WidgetView::Thread => {
            let [page_area, panel_area] = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .areas(body_area);
            render_page_hint(frame, page_area);
            render_panel(frame, panel_area, widget, current_email);
        }
    }

    frame.render_widget(Paragraph::new(status_line(widget)), status_area);
}

fn header_line(current_email: Option<&str>) -> Line<'static> {
    let who = match current_email {
        Some(email) => format!("signed in as {email}"),
        None => "not logged in".to_owned(),
    };
    Line::from(vec![
        Span::styled(APP_TITLE, styles::counterpart_style()),
        Span::styled(format!(" | {who}"), styles::hint_style()),
    ])
}

fn render_page_hint(frame: &mut Frame<'_>, area: Rect) {
    let hint = Paragraph::new("Browse listings with `gatorkeys listings list`.")
        .style(styles::hint_style())
        .wrap(Wrap { trim: true });
    frame.render_widget(hint, area);
}

fn render_closed(frame: &mut Frame<'_>, area: Rect, widget: &WidgetState) {
    render_page_hint(frame, area);

    let label = toggle_label(widget.badge());
    let width = (label.width() as u16).min(area.width);
    let toggle_area = Rect {
        x: area.x + area.width - width,
        y: area.y + area.height.saturating_sub(1),
        width,
        height: 1.min(area.height),
    };
    frame.render_widget(Paragraph::new(toggle_line(widget.badge())), toggle_area);
}

fn toggle_label(badge: Option<u32>) -> String {
    match badge {
        Some(count) => format!(" Messages ({count}) "),
        None => " Messages ".to_owned(),
    }
}

fn toggle_line(badge: Option<u32>) -> Line<'static> {
    match badge {
        Some(count) => Line::from(vec![
            Span::styled(" Messages ", styles::toggle_style()),
            Span::styled(format!("({count}) "), styles::unread_badge_style()),
        ]),
        None => Line::styled(toggle_label(None), styles::toggle_style()),
    }
}

fn render_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    widget: &WidgetState,
    current_email: Option<&str>,
) {
    if widget.login_required() {
        let prompt = Paragraph::new(LOGIN_PROMPT)
            .wrap(Wrap { trim: true })
            .block(panel_block("Messages".to_owned(), true));
        frame.render_widget(prompt, area);
        return;
    }

    match widget.view() {
        WidgetView::Thread => render_thread(frame, area, widget, current_email),
        _ if widget.compose().is_active() => render_compose(frame, area, widget),
        _ => render_conversation_list(frame, area, widget, true),
    }
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        styles::active_border_style()
    } else {
        styles::inactive_border_style()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_conversation_list(
    frame: &mut Frame<'_>,
    area: Rect,
    widget: &WidgetState,
    focused: bool,
) {
    let conversations = widget.conversations();
    let block = panel_block("Messages".to_owned(), focused);

    let placeholder = match conversations.ui_state() {
        ConversationListUiState::Loading => Some("Loading conversations..."),
        ConversationListUiState::Empty => Some("No conversations yet. Press n to start one."),
        ConversationListUiState::Error => Some("Could not load conversations. Press r to retry."),
        ConversationListUiState::Ready => None,
    };
    if let Some(text) = placeholder {
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let row_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem<'static>> = conversations
        .conversations()
        .iter()
        .map(|summary| ListItem::new(conversation_lines(summary, row_width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_row_style());
    let mut list_state = ListState::default();
    list_state.select(conversations.selected_index());
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Two rows per conversation: counterpart with badge and time, then preview.
fn conversation_lines(summary: &ConversationSummary, width: usize) -> Vec<Line<'static>> {
    let mut header = vec![Span::styled(
        truncate_to_width(&summary.other_user_email, width),
        styles::counterpart_style(),
    )];
    if summary.unread_count > 0 {
        header.push(Span::raw(" "));
        header.push(Span::styled(
            format!("({})", summary.unread_count),
            styles::unread_badge_style(),
        ));
    }
    if let Some(timestamp) = summary.last_timestamp {
        header.push(Span::styled(
            format!("  {}", format_time(timestamp)),
            styles::timestamp_style(),
        ));
    }

    let preview = summary
        .last_message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    vec![
        Line::from(header),
        Line::styled(
            format!("  {}", truncate_to_width(&preview, width.saturating_sub(2))),
            styles::preview_style(),
        ),
    ]
}

fn render_compose(frame: &mut Frame<'_>, area: Rect, widget: &WidgetState) {
    let [list_area, recipient_area, message_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .areas(area);

    render_conversation_list(frame, list_area, widget, false);

    let compose = widget.compose();
    render_input(
        frame,
        recipient_area,
        InputField {
            title: "New chat: recipient email",
            placeholder: "someone@ufl.edu",
            state: compose.recipient(),
            focused: compose.focus() == ComposeField::Recipient,
        },
    );
    render_input(
        frame,
        message_area,
        InputField {
            title: "First message",
            placeholder: "Hi! Is your place still available?",
            state: compose.first_message(),
            focused: compose.focus() == ComposeField::FirstMessage,
        },
    );
}

fn render_thread(
    frame: &mut Frame<'_>,
    area: Rect,
    widget: &WidgetState,
    current_email: Option<&str>,
) {
    let [messages_area, input_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .areas(area);

    let thread = widget.thread();
    let title = match thread.other_user_email() {
        Some(email) => format!("Chat with {email}"),
        None => "Chat".to_owned(),
    };
    let block = panel_block(title, true);

    let placeholder = match thread.ui_state() {
        ThreadUiState::Loading => Some("Loading messages..."),
        ThreadUiState::Error => Some("Could not load messages."),
        ThreadUiState::Empty => Some("No messages yet. Say hi!"),
        ThreadUiState::Ready if thread.messages().is_empty() => Some("No messages yet. Say hi!"),
        ThreadUiState::Ready => None,
    };

    match placeholder {
        Some(text) => frame.render_widget(Paragraph::new(text).block(block), messages_area),
        None => {
            let lines = build_thread_lines(
                thread.messages(),
                current_email,
                thread.scroll_from_bottom(),
            );
            let viewport = messages_area.height.saturating_sub(2) as usize;
            let first = lines.len().saturating_sub(viewport);
            let visible: Vec<Line<'static>> = lines.into_iter().skip(first).collect();
            frame.render_widget(Paragraph::new(visible).block(block), messages_area);
        }
    }

    render_input(
        frame,
        input_area,
        InputField {
            title: "",
            placeholder: "Type a message",
            state: widget.input(),
            focused: true,
        },
    );
}

fn status_line(widget: &WidgetState) -> Line<'static> {
    if let Some(error) = widget.last_error() {
        return Line::styled(format!("error: {error}"), styles::error_style());
    }

    let hint = match widget.view() {
        WidgetView::Closed => "Enter: open messages | q: quit",
        WidgetView::List if widget.login_required() => "Esc: close",
        WidgetView::List if widget.compose().is_active() => {
            "Tab: switch field | Enter: start chat | Esc: cancel"
        }
        WidgetView::List => {
            "j/k: navigate | Enter: open | n: new chat | r: refresh | Esc: close | q: quit"
        }
        WidgetView::Thread => "Enter: send | Up/Down: scroll | Esc: back",
    };
    Line::styled(hint, styles::hint_style())
}

/// Cuts `text` to at most `max_width` display columns, ending with an
/// ellipsis when anything was dropped.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut truncated = String::new();
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        truncated.push(ch);
    }
    truncated.push(ELLIPSIS);
    truncated
}

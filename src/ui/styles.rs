//! Style definitions for the chat widget.

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// Panel styles
// =============================================================================

/// Border of the focused panel or input.
pub fn active_border_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Border of panels that do not take keys right now.
pub fn inactive_border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// The floating "Messages" toggle while the panel is closed.
pub fn toggle_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Unread badge on the toggle and per conversation.
pub fn unread_badge_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

// =============================================================================
// Conversation list styles
// =============================================================================

pub fn counterpart_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn preview_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn selected_row_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

// =============================================================================
// Thread styles
// =============================================================================

pub fn timestamp_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Messages the current user sent.
pub fn outgoing_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Messages from the counterpart.
pub fn incoming_style() -> Style {
    Style::default().fg(Color::White)
}

/// Optimistic copy still waiting for the server.
pub fn pending_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

pub fn failed_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::CROSSED_OUT)
}

pub fn date_separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

// =============================================================================
// Input styles
// =============================================================================

pub fn input_prompt_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn input_text_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn input_placeholder_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

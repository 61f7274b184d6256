//! Thread rendering: one line per message, with day separators.

use chrono::{DateTime, Local, NaiveDate, Utc};
use ratatui::text::{Line, Span};

use crate::domain::message::{DeliveryState, ThreadMessage};

use super::styles;

const PENDING_TAG: &str = " (sending...)";
const FAILED_TAG: &str = " (not sent)";

/// Builds the visible thread lines. The last `skip_from_bottom` messages are
/// left out so the user can scroll back.
pub fn build_thread_lines(
    messages: &[ThreadMessage],
    current_email: Option<&str>,
    skip_from_bottom: usize,
) -> Vec<Line<'static>> {
    let visible = messages.len().saturating_sub(skip_from_bottom);
    let mut lines = Vec::with_capacity(visible + 4);
    let mut previous_date: Option<NaiveDate> = None;

    for message in &messages[..visible] {
        let local = message.message.timestamp.with_timezone(&Local);
        let date = local.date_naive();
        if previous_date != Some(date) {
            lines.push(date_separator_line(date));
            previous_date = Some(date);
        }
        lines.push(message_line(message, current_email));
    }

    lines
}

fn date_separator_line(date: NaiveDate) -> Line<'static> {
    Line::styled(
        format!("--- {} ---", format_date(date)),
        styles::date_separator_style(),
    )
}

fn message_line(message: &ThreadMessage, current_email: Option<&str>) -> Line<'static> {
    let outgoing = current_email.is_some_and(|email| message.is_outgoing(email));
    let author = if outgoing {
        "you".to_owned()
    } else {
        message.message.sender.clone()
    };

    let text_style = match message.delivery {
        DeliveryState::Pending => styles::pending_style(),
        DeliveryState::Failed => styles::failed_style(),
        DeliveryState::Confirmed if outgoing => styles::outgoing_style(),
        DeliveryState::Confirmed => styles::incoming_style(),
    };

    let mut spans = vec![
        Span::styled(
            format!("{} ", format_time(message.message.timestamp)),
            styles::timestamp_style(),
        ),
        Span::styled(format!("{author}: "), styles::counterpart_style()),
        Span::styled(normalize_text(&message.message.text), text_style),
    ];
    match message.delivery {
        DeliveryState::Pending => spans.push(Span::styled(PENDING_TAG, styles::pending_style())),
        DeliveryState::Failed => spans.push(Span::styled(FAILED_TAG, styles::error_style())),
        DeliveryState::Confirmed => {}
    }

    Line::from(spans)
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::message::Message;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn confirmed(id: &str, sender: &str, text: &str, timestamp: DateTime<Utc>) -> ThreadMessage {
        ThreadMessage::confirmed(Message {
            id: id.to_owned(),
            sender: sender.to_owned(),
            text: text.to_owned(),
            timestamp,
        })
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn first_message_gets_a_date_separator() {
        let messages = vec![confirmed("1", "b@ufl.edu", "Hi", at(12))];

        let lines = build_thread_lines(&messages, Some("a@ufl.edu"), 0);

        assert_eq!(lines.len(), 2);
        assert!(line_text(&lines[0]).starts_with("---"));
        assert!(line_text(&lines[1]).ends_with("b@ufl.edu: Hi"));
    }

    #[test]
    fn own_messages_are_attributed_to_you() {
        let messages = vec![confirmed("1", "A@ufl.edu", "Is it free?", at(12))];

        let lines = build_thread_lines(&messages, Some("a@ufl.edu"), 0);

        assert!(line_text(&lines[1]).contains("you: Is it free?"));
    }

    #[test]
    fn pending_and_failed_messages_are_tagged() {
        let mut failed = ThreadMessage::pending("a@ufl.edu", "second", at(12), 2);
        failed.delivery = DeliveryState::Failed;
        let messages = vec![ThreadMessage::pending("a@ufl.edu", "first", at(12), 1), failed];

        let lines = build_thread_lines(&messages, Some("a@ufl.edu"), 0);

        assert!(line_text(&lines[1]).ends_with(PENDING_TAG));
        assert!(line_text(&lines[2]).ends_with(FAILED_TAG));
    }

    #[test]
    fn scrolled_back_thread_hides_newest_messages() {
        let messages = vec![
            confirmed("1", "b@ufl.edu", "one", at(10)),
            confirmed("2", "b@ufl.edu", "two", at(11)),
            confirmed("3", "b@ufl.edu", "three", at(12)),
        ];

        let lines = build_thread_lines(&messages, None, 2);

        assert_eq!(lines.len(), 2);
        assert!(line_text(&lines[1]).ends_with("one"));
    }

    #[test]
    fn new_day_inserts_another_separator() {
        let messages = vec![
            confirmed("1", "b@ufl.edu", "one", at(12)),
            confirmed("2", "b@ufl.edu", "two", at(12) + Duration::days(2)),
        ];

        let lines = build_thread_lines(&messages, None, 0);

        let separators = lines
            .iter()
            .filter(|line| line_text(line).starts_with("---"))
            .count();
        assert_eq!(separators, 2);
    }

    #[test]
    fn multiline_text_collapses_to_one_row() {
        let messages = vec![confirmed("1", "b@ufl.edu", "line one\n  line two", at(12))];

        let lines = build_thread_lines(&messages, None, 0);

        assert!(line_text(&lines[1]).ends_with("line one line two"));
    }
}

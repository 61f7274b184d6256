//! Editable single-line text field used by the thread input and the composer.

/// Longest message body the backend accepts.
pub const MAX_INPUT_CHARS: usize = 4000;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageInputState {
    chars: Vec<char>,
    /// Cursor position as a char index into `chars`.
    cursor: usize,
}

impl MessageInputState {
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|ch| ch.is_whitespace())
    }

    /// Returns false when the field is already at `MAX_INPUT_CHARS`.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.chars.len() >= MAX_INPUT_CHARS {
            return false;
        }
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
        true
    }

    pub fn delete_char_before(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_char_at(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = std::cmp::min(self.cursor + 1, self.chars.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Replaces the content, truncating to `MAX_INPUT_CHARS`, cursor at end.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().take(MAX_INPUT_CHARS).collect();
        self.cursor = self.chars.len();
    }

    /// Empties the field and hands back what it held.
    pub fn take_text(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// No input within the poll window; background results get applied.
    Tick,
    QuitRequested,
    InputKey(KeyInput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: Key, ctrl: bool) -> Self {
        Self { key, ctrl }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, false)
    }
}

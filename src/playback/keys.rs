use crate::playback::events::PlayerCommand;

const VOLUME_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Space,
    Left,
    Right,
    Char(char),
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub ctrl: bool,
    /// Set while a text input holds focus; shortcuts are off then.
    pub in_text_input: bool,
}

#[cfg(test)]
impl Key {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            in_text_input: false,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: true,
            in_text_input: false,
        }
    }
}

impl From<crossterm::event::KeyEvent> for Key {
    fn from(event: crossterm::event::KeyEvent) -> Self {
        use crossterm::event::{KeyCode as Ct, KeyModifiers};

        let code = match event.code {
            Ct::Char(' ') => KeyCode::Space,
            Ct::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            Ct::Left => KeyCode::Left,
            Ct::Right => KeyCode::Right,
            Ct::Esc => KeyCode::Esc,
            _ => KeyCode::Other,
        };

        Self {
            code,
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            in_text_input: false,
        }
    }
}

pub fn dispatch(key: Key, seek_step: f64) -> Option<PlayerCommand> {
    if key.in_text_input {
        return None;
    }

    match (key.code, key.ctrl) {
        (KeyCode::Space, _) => Some(PlayerCommand::TogglePlay),
        (KeyCode::Right, true) => Some(PlayerCommand::Next),
        (KeyCode::Right, false) => Some(PlayerCommand::SeekRelative(seek_step)),
        (KeyCode::Left, true) => Some(PlayerCommand::Previous),
        (KeyCode::Left, false) => Some(PlayerCommand::SeekRelative(-seek_step)),
        // Terminals deliver Ctrl+M as Enter, so plain `m` mutes too.
        (KeyCode::Char('m'), _) => Some(PlayerCommand::ToggleMute),
        (KeyCode::Char('c'), true) => Some(PlayerCommand::Quit),
        (KeyCode::Char('s'), false) => Some(PlayerCommand::ToggleShuffle),
        (KeyCode::Char('r'), false) => Some(PlayerCommand::ToggleRepeat),
        (KeyCode::Char('n'), false) => Some(PlayerCommand::Next),
        (KeyCode::Char('p'), false) => Some(PlayerCommand::Previous),
        (KeyCode::Char('+') | KeyCode::Char('='), false) => {
            Some(PlayerCommand::ChangeVolume(VOLUME_STEP))
        }
        (KeyCode::Char('-'), false) => Some(PlayerCommand::ChangeVolume(-VOLUME_STEP)),
        (KeyCode::Char(c @ '0'..='9'), false) => {
            let tenths = c.to_digit(10).unwrap_or(0);
            Some(PlayerCommand::SeekFraction(f64::from(tenths) / 10.0))
        }
        (KeyCode::Char('q'), false) | (KeyCode::Esc, _) => Some(PlayerCommand::Quit),
        _ => None,
    }
}

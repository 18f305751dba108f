use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::GfiError;
use crate::types::Issue;

/// Everything the state machine reacts to, one value per loop turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    FetchSucceeded { issues: Vec<Issue>, total: u64 },
    FetchFailed(String),
    Key(KeyEvent),
    /// Animation tick from the driver; forwarded to widgets.
    Tick,
}

impl From<GfiError> for Message {
    fn from(err: GfiError) -> Self {
        Message::FetchFailed(err.to_string())
    }
}

/// Deferred effect returned by `App::update` and carried out by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the issue search on its own task; it answers with a fetch message.
    FetchIssues,
    /// Print a line above the UI without touching application state.
    Print(String),
}

/// Bare `q` or Ctrl+C. Shift is allowed on `q` since some terminals
/// report it alongside the character.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => matches!(key.modifiers, KeyModifiers::NONE | KeyModifiers::SHIFT),
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    }

    #[test]
    fn modified_q_does_not_quit() {
        for modifiers in [
            KeyModifiers::ALT,
            KeyModifiers::CONTROL,
            KeyModifiers::SUPER,
            KeyModifiers::ALT | KeyModifiers::SHIFT,
        ] {
            assert!(
                !is_quit_key(&KeyEvent::new(KeyCode::Char('q'), modifiers)),
                "{:?}+q quit",
                modifiers
            );
        }
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn error_becomes_failure_message() {
        assert_eq!(
            Message::from(GfiError::UnexpectedStatus(403)),
            Message::FetchFailed("unexpected status code: 403".to_string())
        );
    }
}

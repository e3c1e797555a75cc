//! Translation from crossterm events to the abstract input vocabulary.
//!
//! This is the only module that sees backend key codes; the session state
//! machine consumes [`InputAction`] values exclusively.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gridlife_core::InputAction;

/// Maps a key event to an action, or `None` for unbound keys.
pub fn translate_key(key: KeyEvent) -> Option<InputAction> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(InputAction::Quit),
        (KeyCode::Char('q') | KeyCode::Char('Q'), _) => Some(InputAction::Quit),
        (KeyCode::Char('p'), _) => Some(InputAction::Start),
        (KeyCode::Char('h'), _) => Some(InputAction::ToggleHelp),
        (KeyCode::Char('r'), _) => Some(InputAction::Reset),
        (KeyCode::Char('s'), _) => Some(InputAction::SoftReset),
        (KeyCode::Char('o'), _) => Some(InputAction::Save),
        (KeyCode::Esc | KeyCode::Char(' '), _) => Some(InputAction::TogglePause),
        (KeyCode::Char('+') | KeyCode::Char('='), _) => Some(InputAction::SpeedUp),
        (KeyCode::Char('-') | KeyCode::Char('_'), _) => Some(InputAction::SlowDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_has_three_spellings() {
        assert_eq!(translate_key(key(KeyCode::Char('q'))), Some(InputAction::Quit));
        assert_eq!(translate_key(key(KeyCode::Char('Q'))), Some(InputAction::Quit));
        assert_eq!(
            translate_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputAction::Quit)
        );
    }

    #[test]
    fn pause_binds_escape_and_space() {
        assert_eq!(translate_key(key(KeyCode::Esc)), Some(InputAction::TogglePause));
        assert_eq!(translate_key(key(KeyCode::Char(' '))), Some(InputAction::TogglePause));
    }

    #[test]
    fn speed_keys_tolerate_unshifted_variants() {
        assert_eq!(translate_key(key(KeyCode::Char('='))), Some(InputAction::SpeedUp));
        assert_eq!(translate_key(key(KeyCode::Char('_'))), Some(InputAction::SlowDown));
    }

    #[test]
    fn unbound_keys_map_to_nothing() {
        assert_eq!(translate_key(key(KeyCode::Char('x'))), None);
        assert_eq!(translate_key(key(KeyCode::F(1))), None);
    }
}

use crate::line_editor::{ERASE, SUBMIT};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// One input unit for the line editor.
    Unit(char),
    /// Leave the interactive loop.
    Quit,
    Ignored,
}

/// Map a terminal key event onto the units the line editor understands.
pub fn translate(event: &KeyEvent) -> KeyInput {
    if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return KeyInput::Ignored;
    }

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('d') => KeyInput::Quit,
            _ => KeyInput::Ignored,
        };
    }

    match event.code {
        KeyCode::Enter => KeyInput::Unit(SUBMIT),
        KeyCode::Backspace => KeyInput::Unit(ERASE),
        KeyCode::Tab => KeyInput::Unit('\t'),
        KeyCode::Char(c) => KeyInput::Unit(c),
        _ => KeyInput::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_editing_keys() {
        assert_eq!(
            translate(&press(KeyCode::Enter, KeyModifiers::NONE)),
            KeyInput::Unit('\r')
        );
        assert_eq!(
            translate(&press(KeyCode::Backspace, KeyModifiers::NONE)),
            KeyInput::Unit('\x7f')
        );
        assert_eq!(
            translate(&press(KeyCode::Tab, KeyModifiers::NONE)),
            KeyInput::Unit('\t')
        );
    }

    #[test]
    fn test_printable_chars_keep_shift() {
        assert_eq!(
            translate(&press(KeyCode::Char('L'), KeyModifiers::SHIFT)),
            KeyInput::Unit('L')
        );
    }

    #[test]
    fn test_ctrl_c_and_ctrl_d_quit() {
        assert_eq!(
            translate(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyInput::Quit
        );
        assert_eq!(
            translate(&press(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            KeyInput::Quit
        );
        assert_eq!(
            translate(&press(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            KeyInput::Ignored
        );
    }

    #[test]
    fn test_navigation_keys_ignored() {
        assert_eq!(
            translate(&press(KeyCode::Left, KeyModifiers::NONE)),
            KeyInput::Ignored
        );
        assert_eq!(
            translate(&press(KeyCode::Esc, KeyModifiers::NONE)),
            KeyInput::Ignored
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(translate(&release), KeyInput::Ignored);
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    ShowHelp,
    HideHelp,
    SwitchView,
    Back,
    MoveUp,
    MoveDown,
    Select,
    EditUrl,
    CycleFormat,
    StartSearch,
    Delete,
    ConfirmYes,
    ConfirmNo,
    OpenInBrowser,
    ExportText,
    ExportPdf,
    CopySummary,
    Logout,
    // Text input actions (URL, search, login)
    InputChar(char),
    InputBackspace,
    InputConfirm,
    InputCancel,
}

pub fn handle_key_event(
    key: KeyEvent,
    input_active: bool,
    confirm_active: bool,
    show_help: bool,
) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    if input_active {
        return match key.code {
            KeyCode::Enter => Some(AppAction::InputConfirm),
            KeyCode::Esc => Some(AppAction::InputCancel),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        };
    }

    if confirm_active {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(AppAction::ConfirmYes),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(AppAction::ConfirmNo),
            _ => None,
        };
    }

    // Normal mode
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(AppAction::Quit),

        (KeyCode::Tab, _) => Some(AppAction::SwitchView),
        (KeyCode::Esc, _) => Some(AppAction::Back),

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),

        (KeyCode::Enter, _) => Some(AppAction::Select),

        (KeyCode::Char('i'), _) | (KeyCode::Char('u'), _) => Some(AppAction::EditUrl),
        (KeyCode::Char('f'), _) => Some(AppAction::CycleFormat),
        (KeyCode::Char('/'), _) => Some(AppAction::StartSearch),
        (KeyCode::Char('d'), _) => Some(AppAction::Delete),
        (KeyCode::Char('o'), _) => Some(AppAction::OpenInBrowser),
        (KeyCode::Char('t'), _) => Some(AppAction::ExportText),
        (KeyCode::Char('p'), _) => Some(AppAction::ExportPdf),
        (KeyCode::Char('c'), _) => Some(AppAction::CopySummary),
        (KeyCode::Char('L'), _) => Some(AppAction::Logout),

        (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

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
    fn ctrl_c_quits_even_while_typing() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(event, true, false, false), Some(AppAction::Quit));
    }

    #[test]
    fn typing_captures_command_keys() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), true, false, false),
            Some(AppAction::InputChar('q'))
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Enter), true, false, false),
            Some(AppAction::InputConfirm)
        );
    }

    #[test]
    fn confirmation_only_accepts_yes_or_no() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('y')), false, true, false),
            Some(AppAction::ConfirmYes)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Esc), false, true, false),
            Some(AppAction::ConfirmNo)
        );
        assert_eq!(handle_key_event(key(KeyCode::Char('d')), false, true, false), None);
    }

    #[test]
    fn help_swallows_next_key() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), false, false, true),
            Some(AppAction::HideHelp)
        );
    }

    #[test]
    fn normal_mode_bindings() {
        assert_eq!(handle_key_event(key(KeyCode::Tab), false, false, false), Some(AppAction::SwitchView));
        assert_eq!(handle_key_event(key(KeyCode::Char('f')), false, false, false), Some(AppAction::CycleFormat));
        assert_eq!(handle_key_event(key(KeyCode::Char('p')), false, false, false), Some(AppAction::ExportPdf));
        assert_eq!(handle_key_event(key(KeyCode::Char('c')), false, false, false), Some(AppAction::CopySummary));
    }
}

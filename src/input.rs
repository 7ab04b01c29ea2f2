//! Keyboard input mapping
//!
//! Turns crossterm key events into game actions using the bindings from the
//! settings file. Ctrl+C always leaves the program; Esc does too unless it is
//! bound to an action.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quadtris::game::Action;
use quadtris::settings::Settings;
use tracing::warn;

/// What a key press asks the front end to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Game(Action),
    Exit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(KeyCode, Action)>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            f if f.starts_with('f') && f.len() > 1 => KeyCode::F(f[1..].parse().ok()?),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        let table: [(&[String], Action); 8] = [
            (keys.move_left.as_slice(), Action::Left),
            (keys.move_right.as_slice(), Action::Right),
            (keys.move_down.as_slice(), Action::Down),
            (keys.rotate.as_slice(), Action::Rotate),
            (keys.pause.as_slice(), Action::Pause),
            (keys.restart.as_slice(), Action::Restart),
            (keys.quit.as_slice(), Action::Quit),
            (keys.toggle_quad_mode.as_slice(), Action::ToggleQuadMode),
        ];

        let mut bindings = Vec::new();
        for (names, action) in table {
            for name in names {
                match Self::parse_key(name) {
                    Some(code) => bindings.push((code, action)),
                    None => warn!(key = %name, ?action, "ignoring unknown key binding"),
                }
            }
        }
        Self { bindings }
    }

    /// First action bound to a key
    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        let code = normalize_key(code);
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, action)| *action)
    }

    /// Map a key press to a command
    pub fn command_for(&self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Exit);
        }
        match self.action_for(key.code) {
            Some(action) => Some(Command::Game(action)),
            None if key.code == KeyCode::Esc => Some(Command::Exit),
            None => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action_for(KeyCode::Left), Some(Action::Left));
        assert_eq!(keys.action_for(KeyCode::Char('a')), Some(Action::Left));
        assert_eq!(keys.action_for(KeyCode::Char('D')), Some(Action::Right));
        assert_eq!(keys.action_for(KeyCode::Char('s')), Some(Action::Down));
        assert_eq!(keys.action_for(KeyCode::Up), Some(Action::Rotate));
        assert_eq!(keys.action_for(KeyCode::Char(' ')), Some(Action::Pause));
        assert_eq!(keys.action_for(KeyCode::Char('r')), Some(Action::Restart));
        assert_eq!(keys.action_for(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(keys.action_for(KeyCode::Char('m')), Some(Action::ToggleQuadMode));
        assert_eq!(keys.action_for(KeyCode::Char('z')), None);
    }

    #[test]
    fn test_exit_keys() {
        let keys = KeyBindings::default();
        assert_eq!(keys.command_for(press(KeyCode::Esc)), Some(Command::Exit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(keys.command_for(ctrl_c), Some(Command::Exit));
        assert_eq!(
            keys.command_for(press(KeyCode::Char('p'))),
            Some(Command::Game(Action::Pause))
        );
    }

    #[test]
    fn test_bound_esc_runs_its_action() {
        let mut settings = Settings::default();
        settings.keys.quit = vec!["q".to_string(), "Esc".to_string()];
        let keys = KeyBindings::from_settings(&settings);
        assert_eq!(
            keys.command_for(press(KeyCode::Esc)),
            Some(Command::Game(Action::Quit))
        );
        // Ctrl+C still leaves
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(keys.command_for(ctrl_c), Some(Command::Exit));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(KeyBindings::parse_key("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyBindings::parse_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(KeyBindings::parse_key("X"), Some(KeyCode::Char('x')));
        assert_eq!(KeyBindings::parse_key("nonsense"), None);
    }

    #[test]
    fn test_custom_binding() {
        let mut settings = Settings::default();
        settings.keys.rotate = vec!["x".to_string()];
        let keys = KeyBindings::from_settings(&settings);
        assert_eq!(keys.action_for(KeyCode::Char('x')), Some(Action::Rotate));
        assert_eq!(keys.action_for(KeyCode::Up), None);
    }
}

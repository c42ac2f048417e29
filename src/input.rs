//! Key bindings: static tables from key to action.

use crate::tetromino::TetrominoKind;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Place a piece of this variant at the spawn anchor.
    Place(TetrominoKind),
    /// Place whatever the generator hands out next.
    SpawnNext,
    /// Turn the rotation used for following placements.
    RotateCw,
    RotateCcw,
    ClearAll,
    Quit,
    None,
}

/// Number keys 1-7, in generator order.
const PLACE_KEYS: [(char, TetrominoKind); 7] = [
    ('1', TetrominoKind::I),
    ('2', TetrominoKind::J),
    ('3', TetrominoKind::L),
    ('4', TetrominoKind::O),
    ('5', TetrominoKind::S),
    ('6', TetrominoKind::T),
    ('7', TetrominoKind::Z),
];

const PLAIN_KEYS: [(char, Action); 4] = [
    ('n', Action::SpawnNext),
    ('r', Action::RotateCw),
    ('e', Action::RotateCcw),
    ('q', Action::ClearAll),
];

const CTRL_KEYS: [(char, Action); 1] = [('q', Action::Quit)];

/// Map a key event to an action. Shift is ignored; other modifiers except Ctrl give `None`.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let KeyCode::Char(c) = code else {
        return Action::None;
    };
    let c = c.to_ascii_lowercase();
    let lookup = |table: &[(char, Action)]| {
        table
            .iter()
            .find(|(k, _)| *k == c)
            .map_or(Action::None, |&(_, a)| a)
    };
    let plain = modifiers.difference(KeyModifiers::SHIFT);
    if plain == KeyModifiers::CONTROL {
        return lookup(&CTRL_KEYS);
    }
    if !plain.is_empty() {
        return Action::None;
    }
    PLACE_KEYS
        .iter()
        .find(|(k, _)| *k == c)
        .map_or_else(|| lookup(&PLAIN_KEYS), |&(_, kind)| Action::Place(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), modifiers)
    }

    #[test]
    fn test_number_keys_place_variants() {
        for (i, kind) in TetrominoKind::ALL.iter().enumerate() {
            let c = char::from(b'1' + i as u8);
            assert_eq!(key_to_action(key(c, KeyModifiers::NONE)), Action::Place(*kind));
        }
        assert_eq!(key_to_action(key('8', KeyModifiers::NONE)), Action::None);
    }

    #[test]
    fn test_q_clears_ctrl_q_quits() {
        assert_eq!(key_to_action(key('q', KeyModifiers::NONE)), Action::ClearAll);
        assert_eq!(key_to_action(key('Q', KeyModifiers::SHIFT)), Action::ClearAll);
        assert_eq!(key_to_action(key('q', KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(key_to_action(key('n', KeyModifiers::CONTROL)), Action::None);
        // Ctrl+C is handled as an interrupt event before key mapping.
        assert_eq!(key_to_action(key('c', KeyModifiers::CONTROL)), Action::None);
    }

    #[test]
    fn test_other_keys() {
        assert_eq!(key_to_action(key('n', KeyModifiers::NONE)), Action::SpawnNext);
        assert_eq!(key_to_action(key('r', KeyModifiers::NONE)), Action::RotateCw);
        assert_eq!(key_to_action(key('e', KeyModifiers::NONE)), Action::RotateCcw);
        assert_eq!(key_to_action(key('n', KeyModifiers::ALT)), Action::None);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Action::None
        );
    }
}

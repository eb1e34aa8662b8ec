//! Application-level keyboard shortcuts
//!
//! Shortcuts are explicit subscriptions: the session registers the chords it
//! cares about when it attaches and removes them when it detaches. Nothing is
//! installed globally.

use crate::config::ConfigError;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Something a shortcut can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Save,
    OpenFolder,
}

/// Where keyboard focus currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusContext {
    /// The application chrome (tree, toolbar, ...)
    Application,
    /// The editing surface, which intercepts its own shortcuts
    Surface,
}

/// What the caller should do with the key event afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Handled; the platform's default action must be suppressed
    Consumed,
    /// Not ours; let it through
    Ignored,
}

/// A key plus exact modifier set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code: normalize(code),
            modifiers,
        }
    }

    /// Parse a config-style chord such as `("s", ["ctrl"])`
    pub fn parse(key: &str, modifiers: &[String]) -> Result<Self, ConfigError> {
        let code = parse_key_code(key)
            .ok_or_else(|| ConfigError::ValidationError(format!("Unknown key: {key:?}")))?;

        let mut mods = KeyModifiers::NONE;
        for modifier in modifiers {
            mods |= match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "super" | "cmd" | "command" => KeyModifiers::SUPER,
                "meta" => KeyModifiers::META,
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "Unknown modifier: {other:?}"
                    )))
                }
            };
        }

        Ok(Self::new(code, mods))
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        normalize(event.code) == self.code && event.modifiers == self.modifiers
    }
}

/// Letters compare case-insensitively
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn parse_key_code(key: &str) -> Option<KeyCode> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let lower = key.to_ascii_lowercase();
    match lower.as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" => Some(KeyCode::Delete),
        _ => lower
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=24).contains(n))
            .map(KeyCode::F),
    }
}

/// Handle returned by [`ShortcutRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered chord -> action subscriptions
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    next_id: u64,
    subscriptions: Vec<(SubscriptionId, KeyChord, Action)>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, chord: KeyChord, action: Action) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push((id, chord, action));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(sub, _, _)| *sub != id);
        self.subscriptions.len() != before
    }

    /// Action bound to this chord, whatever the event kind
    pub fn lookup(&self, event: &KeyEvent) -> Option<Action> {
        self.subscriptions
            .iter()
            .find(|(_, chord, _)| chord.matches(event))
            .map(|(_, _, action)| *action)
    }

    /// Action bound to this key press, if any
    ///
    /// Only the initial press resolves; auto-repeat and release events don't,
    /// so each physical press triggers at most once.
    pub fn resolve(&self, event: &KeyEvent) -> Option<Action> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        self.lookup(event)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

//! Input handling

pub mod keybindings;

pub use keybindings::{
    Action, FocusContext, KeyChord, KeyOutcome, ShortcutRegistry, SubscriptionId,
};

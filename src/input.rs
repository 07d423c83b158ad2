//! Keyboard input for the terminal front end
//!
//! The game wants level-triggered intents ("is the key down this frame").
//! Key release events are unreliable on Linux terminals, so a key counts as
//! held until its release arrives or no press/repeat has been seen for
//! `KEY_TIMEOUT`.

use crate::game::{Intent, Intents};
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Front-end commands that are not game intents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Restart,
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Indexed like `Intent::ALL`
    intents: [Vec<KeyCode>; 6],
    restart: Vec<KeyCode>,
    quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!("Ignoring unknown key binding {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            intents: [
                Self::parse_keys(&keys.move_left),
                Self::parse_keys(&keys.move_right),
                Self::parse_keys(&keys.rotate_cw),
                Self::parse_keys(&keys.soft_drop),
                Self::parse_keys(&keys.hard_drop),
                Self::parse_keys(&keys.pause),
            ],
            restart: Self::parse_keys(&keys.restart),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    fn intent_for(&self, code: KeyCode) -> Option<Intent> {
        Intent::ALL
            .into_iter()
            .zip(&self.intents)
            .find(|(_, codes)| codes.contains(&code))
            .map(|(intent, _)| intent)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Tracks which bound keys are currently held
pub struct InputHandler {
    bindings: KeyBindings,
    /// Last press/repeat per intent, indexed like `Intent::ALL`
    last_seen: [Option<Instant>; 6],
}

impl InputHandler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            last_seen: [None; 6],
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(KeyBindings::from_settings(settings))
    }

    /// Handle a key press or repeat event
    pub fn key_down(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }

        let code = normalize_key(key.code);
        if self.bindings.quit.contains(&code) {
            return Some(Command::Quit);
        }
        if self.bindings.restart.contains(&code) {
            return Some(Command::Restart);
        }
        if let Some(intent) = self.bindings.intent_for(code) {
            self.last_seen[intent as usize] = Some(now);
        }
        None
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        if let Some(intent) = self.bindings.intent_for(normalize_key(key.code)) {
            self.last_seen[intent as usize] = None;
        }
    }

    /// Intents held at `now`; keys silent for longer than the timeout are released
    pub fn intents(&mut self, now: Instant) -> Intents {
        let mut intents = Intents::NONE;
        for (intent, seen) in Intent::ALL.into_iter().zip(self.last_seen.iter_mut()) {
            if seen.is_some_and(|at| now.duration_since(at) > KEY_TIMEOUT) {
                *seen = None;
            }
            if seen.is_some() {
                intents.insert(intent);
            }
        }
        intents
    }

    /// Clear all held keys (useful for restart)
    pub fn clear(&mut self) {
        self.last_seen = [None; 6];
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

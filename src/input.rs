//! Mapping from input events to counter commands.
//!
//! Keys use the browser `KeyboardEvent.key` names (`ArrowUp`, `+`, `r`, ...).
//! Controls are the ids of the three buttons.

use std::collections::HashMap;
use std::fmt;

/// A counter mutation requested by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Increment,
    Decrement,
    Reset,
}

impl Command {
    /// Resolve a button id (`increase`, `decrease`, `reset`).
    pub fn from_control(id: &str) -> Option<Self> {
        match id {
            "increase" => Some(Command::Increment),
            "decrease" => Some(Command::Decrement),
            "reset" => Some(Command::Reset),
            _ => None,
        }
    }

    pub fn control_id(self) -> &'static str {
        match self {
            Command::Increment => "increase",
            Command::Decrement => "decrease",
            Command::Reset => "reset",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Increment => "increment",
            Command::Decrement => "decrement",
            Command::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Key bindings. Key names are matched exactly, so `r` and `R` are separate
/// bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<String, Command>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        keymap.bind("ArrowUp", Command::Increment);
        keymap.bind("+", Command::Increment);
        keymap.bind("ArrowDown", Command::Decrement);
        keymap.bind("-", Command::Decrement);
        keymap.bind("r", Command::Reset);
        keymap.bind("R", Command::Reset);
        keymap
    }
}

impl Keymap {
    /// A keymap with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key` to `command`, replacing any existing binding for that key.
    /// Returns the previous command, if any.
    pub fn bind(&mut self, key: impl Into<String>, command: Command) -> Option<Command> {
        self.bindings.insert(key.into(), command)
    }

    pub fn unbind(&mut self, key: &str) -> Option<Command> {
        self.bindings.remove(key)
    }

    pub fn resolve(&self, key: &str) -> Option<Command> {
        self.bindings.get(key).copied()
    }

    /// Keys bound to `command`, sorted.
    pub fn keys_for(&self, command: Command) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == command)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

//! Customizable keybindings for the editor.
//!
//! Maps key presses to the three signals the session understands: select a
//! tool (or none, which cancels the current drawing), undo and redo. The UI
//! layer feeds raw key presses to [`KeyBindings::resolve`] and dispatches the
//! resulting [`InputCommand`] with [`Session::handle_input`].
//!
//! [`Session::handle_input`]: crate::session::Session::handle_input

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tool::Tool;

/// Physical keys the editor can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Escape,
    Space,
    Tab,
    Enter,
    Backspace,
    Delete,
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::A,
    KeyCode::B,
    KeyCode::C,
    KeyCode::D,
    KeyCode::E,
    KeyCode::F,
    KeyCode::G,
    KeyCode::H,
    KeyCode::I,
    KeyCode::J,
    KeyCode::K,
    KeyCode::L,
    KeyCode::M,
    KeyCode::N,
    KeyCode::O,
    KeyCode::P,
    KeyCode::Q,
    KeyCode::R,
    KeyCode::S,
    KeyCode::T,
    KeyCode::U,
    KeyCode::V,
    KeyCode::W,
    KeyCode::X,
    KeyCode::Y,
    KeyCode::Z,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Key0,
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
];

impl KeyCode {
    /// Key for a character; letters are case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            let index = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            return LETTERS.get(index).copied();
        }
        if c == ' ' {
            return Some(KeyCode::Space);
        }
        c.to_digit(10).and_then(|d| DIGITS.get(d as usize).copied())
    }

    /// Parse a key name such as `"b"`, `"7"` or `"Escape"`.
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_char(c);
        }
        match name.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Some(KeyCode::Escape),
            "space" => Some(KeyCode::Space),
            "tab" => Some(KeyCode::Tab),
            "enter" | "return" => Some(KeyCode::Enter),
            "backspace" => Some(KeyCode::Backspace),
            "delete" | "del" => Some(KeyCode::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(key_to_string(*self))
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };

    /// Whether a shortcut modifier (ctrl, alt or meta) is held.
    pub fn any_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A key together with the exact modifiers it must be pressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: KeyCode,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    pub fn ctrl_shift(key: KeyCode) -> Self {
        Self::new(key, Modifiers::CTRL_SHIFT)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.ctrl, "Ctrl+"),
            (m.alt, "Alt+"),
            (m.meta, "Meta+"),
            (m.shift, "Shift+"),
        ] {
            if held {
                f.write_str(name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Switch to a tool; `None` cancels the current drawing
    SetTool(Option<Tool>),
    Undo,
    Redo,
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Single-key tool selection; a `null` tool clears the active tool
    pub tools: BTreeMap<KeyCode, Option<Tool>>,
    /// Chords that trigger undo
    pub undo: Vec<KeyChord>,
    /// Chords that trigger redo
    pub redo: Vec<KeyChord>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let tools = [
            (KeyCode::V, Some(Tool::Select)),
            (KeyCode::M, Some(Tool::Move)),
            (KeyCode::B, Some(Tool::BoundingBox)),
            (KeyCode::P, Some(Tool::Polygon)),
            (KeyCode::K, Some(Tool::Keypoint)),
            (KeyCode::R, Some(Tool::Brush)),
            (KeyCode::E, Some(Tool::Eraser)),
            (KeyCode::W, Some(Tool::MagicWand)),
            (KeyCode::S, Some(Tool::Skeleton)),
            (KeyCode::C, Some(Tool::Classification)),
            (KeyCode::Escape, None),
        ];
        Self {
            tools: tools.into_iter().collect(),
            undo: vec![KeyChord::ctrl(KeyCode::Z)],
            redo: vec![KeyChord::ctrl(KeyCode::Y), KeyChord::ctrl_shift(KeyCode::Z)],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a key press into a command.
    ///
    /// Nothing is resolved while a text field has focus. Undo and redo need
    /// their exact chord; tool keys are ignored while ctrl, alt or meta is held.
    pub fn resolve(
        &self,
        key: KeyCode,
        modifiers: Modifiers,
        text_focus: bool,
    ) -> Option<InputCommand> {
        if text_focus {
            return None;
        }
        let chord = KeyChord::new(key, modifiers);
        if self.undo.contains(&chord) {
            return Some(InputCommand::Undo);
        }
        if self.redo.contains(&chord) {
            return Some(InputCommand::Redo);
        }
        if modifiers.any_command() {
            return None;
        }
        self.tool_for_key(key).map(InputCommand::SetTool)
    }

    /// Get the tool bound to a key.
    ///
    /// `Some(None)` is the cancel binding; `None` means the key is unbound.
    pub fn tool_for_key(&self, key: KeyCode) -> Option<Option<Tool>> {
        self.tools.get(&key).copied()
    }

    /// Get the first key bound to a tool (or to cancel, for `None`).
    pub fn key_for_tool(&self, tool: Option<Tool>) -> Option<KeyCode> {
        self.tools
            .iter()
            .find(|(_, bound)| **bound == tool)
            .map(|(key, _)| *key)
    }

    /// Bind a key to a tool, replacing the tool's previous keys.
    pub fn set_tool_key(&mut self, tool: Option<Tool>, key: KeyCode) {
        self.tools.retain(|_, bound| *bound != tool);
        self.tools.insert(key, tool);
    }

    /// Check if a key is already used by a tool binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: KeyCode, exclude_tool: Option<Tool>) -> Option<String> {
        match self.tool_for_key(key)? {
            bound if bound == exclude_tool => None,
            Some(tool) => Some(format!("{} tool", tool.name())),
            None => Some("Cancel drawing".to_string()),
        }
    }
}

/// Convert a KeyCode to a display string.
pub fn key_to_string(key: KeyCode) -> &'static str {
    match key {
        KeyCode::A => "A",
        KeyCode::B => "B",
        KeyCode::C => "C",
        KeyCode::D => "D",
        KeyCode::E => "E",
        KeyCode::F => "F",
        KeyCode::G => "G",
        KeyCode::H => "H",
        KeyCode::I => "I",
        KeyCode::J => "J",
        KeyCode::K => "K",
        KeyCode::L => "L",
        KeyCode::M => "M",
        KeyCode::N => "N",
        KeyCode::O => "O",
        KeyCode::P => "P",
        KeyCode::Q => "Q",
        KeyCode::R => "R",
        KeyCode::S => "S",
        KeyCode::T => "T",
        KeyCode::U => "U",
        KeyCode::V => "V",
        KeyCode::W => "W",
        KeyCode::X => "X",
        KeyCode::Y => "Y",
        KeyCode::Z => "Z",
        KeyCode::Key0 => "0",
        KeyCode::Key1 => "1",
        KeyCode::Key2 => "2",
        KeyCode::Key3 => "3",
        KeyCode::Key4 => "4",
        KeyCode::Key5 => "5",
        KeyCode::Key6 => "6",
        KeyCode::Key7 => "7",
        KeyCode::Key8 => "8",
        KeyCode::Key9 => "9",
        KeyCode::Escape => "Esc",
        KeyCode::Space => "Space",
        KeyCode::Tab => "Tab",
        KeyCode::Enter => "Enter",
        KeyCode::Backspace => "Backspace",
        KeyCode::Delete => "Delete",
    }
}

//! Customizable keybindings for the table annotator.
//!
//! Keys are stored by name so that the bindings can live inside the JSON
//! configuration file.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A keyboard key the annotator can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
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
    Escape,
    Backspace,
    Delete,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl Key {
    /// Parse a key from its browser-style name (`"a"`, `"Escape"`, ...).
    pub fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "Escape" => Key::Escape,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            " " | "Space" => Key::Space,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            _ => {
                let mut chars = name.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return None;
                };
                return Self::letter(c.to_ascii_lowercase());
            }
        };
        Some(key)
    }

    fn letter(c: char) -> Option<Key> {
        const LETTERS: [Key; 26] = [
            Key::A,
            Key::B,
            Key::C,
            Key::D,
            Key::E,
            Key::F,
            Key::G,
            Key::H,
            Key::I,
            Key::J,
            Key::K,
            Key::L,
            Key::M,
            Key::N,
            Key::O,
            Key::P,
            Key::Q,
            Key::R,
            Key::S,
            Key::T,
            Key::U,
            Key::V,
            Key::W,
            Key::X,
            Key::Y,
            Key::Z,
        ];
        if !c.is_ascii_lowercase() {
            return None;
        }
        LETTERS.get((c as u8 - b'a') as usize).copied()
    }
}

/// Keybinding configuration for the annotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub previous_image: Key,
    pub next_image: Key,
    /// Rotate the page view by the configured step
    pub rotate_clockwise: Key,
    pub rotate_counter_clockwise: Key,
    /// Abort drawing and forget deletion marks
    pub cancel: Key,
    /// One press of the delete-table gesture
    pub delete: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            previous_image: Key::A,
            next_image: Key::D,
            rotate_clockwise: Key::W,
            rotate_counter_clockwise: Key::S,
            cancel: Key::Escape,
            delete: Key::Backspace,
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the message a key press stands for, if any.
    ///
    /// `rotation_step` is the view rotation applied per press, in degrees.
    pub fn action_for_key(&self, key: Key, rotation_step: f32) -> Option<Message> {
        if key == self.cancel {
            Some(Message::CancelActions)
        } else if key == self.delete {
            Some(Message::DeleteTable)
        } else if key == self.previous_image {
            Some(Message::PreviousImage)
        } else if key == self.next_image {
            Some(Message::NextImage)
        } else if key == self.rotate_clockwise {
            Some(Message::RotateView(rotation_step))
        } else if key == self.rotate_counter_clockwise {
            Some(Message::RotateView(-rotation_step))
        } else {
            None
        }
    }

    /// Check if a key is already used by any binding.
    /// Returns what it is used for, if anything.
    pub fn key_conflict(&self, key: Key) -> Option<&'static str> {
        [
            (self.previous_image, "Previous image"),
            (self.next_image, "Next image"),
            (self.rotate_clockwise, "Rotate clockwise"),
            (self.rotate_counter_clockwise, "Rotate counter-clockwise"),
            (self.cancel, "Cancel"),
            (self.delete, "Delete"),
        ]
        .into_iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| action)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mappings::KeyNameToEvdevCode;

/// Состояние клавиши или кнопки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl KeyState {
    /// Значение поля `value` события EV_KEY
    pub fn from_evdev_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }

    /// `Some(pressed)` для нажатия/отпускания, `None` для аппаратного повтора
    pub fn pressed(self) -> Option<bool> {
        match self {
            KeyState::Pressed => Some(true),
            KeyState::Released => Some(false),
            KeyState::Repeat => None,
        }
    }

    pub fn evdev_value(self) -> i32 {
        match self {
            KeyState::Released => 0,
            KeyState::Pressed => 1,
            KeyState::Repeat => 2,
        }
    }
}

/// Код клавиши или кнопки мыши (evdev коды, тип EV_KEY)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    #[allow(dead_code)]
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match KeyNameToEvdevCode::reverse_translate(self.0) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "KEY_{}", self.0),
        }
    }
}

/// Синтетическое событие, отправляемое при обнаружении белого
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emission {
    Key(KeyCode),
    MouseButton(KeyCode),
}

impl Emission {
    pub fn key_code(&self) -> KeyCode {
        match self {
            Emission::Key(code) | Emission::MouseButton(code) => *code,
        }
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emission::Key(code) => write!(f, "клавиша {}", code),
            Emission::MouseButton(code) => write!(f, "кнопка мыши {}", code),
        }
    }
}

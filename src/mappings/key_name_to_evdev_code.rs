/// Преобразование имён клавиш и кнопок мыши в evdev коды
/// Отвечает за трансляцию строковых имён из конфигурации в числовые коды EV_KEY
pub struct KeyNameToEvdevCode;

/// Клавиатурные клавиши: имя -> evdev код
const KEYBOARD: &[(&str, u16)] = &[
    // Модификаторы
    ("leftalt", 56),     // KEY_LEFTALT
    ("rightalt", 100),   // KEY_RIGHTALT
    ("leftctrl", 29),    // KEY_LEFTCTRL
    ("rightctrl", 97),   // KEY_RIGHTCTRL
    ("leftshift", 42),   // KEY_LEFTSHIFT
    ("rightshift", 54),  // KEY_RIGHTSHIFT
    ("leftmeta", 125),   // KEY_LEFTMETA

    // Буквенные клавиши
    ("a", 30), ("b", 48), ("c", 46), ("d", 32), ("e", 18), ("f", 33),
    ("g", 34), ("h", 35), ("i", 23), ("j", 36), ("k", 37), ("l", 38),
    ("m", 50), ("n", 49), ("o", 24), ("p", 25), ("q", 16), ("r", 19),
    ("s", 31), ("t", 20), ("u", 22), ("v", 47), ("w", 17), ("x", 45),
    ("y", 21), ("z", 44),

    // Цифровые клавиши (верхний ряд)
    ("1", 2), ("2", 3), ("3", 4), ("4", 5), ("5", 6),
    ("6", 7), ("7", 8), ("8", 9), ("9", 10), ("0", 11),

    // Специальные клавиши
    ("space", 57),       // KEY_SPACE
    ("enter", 28),       // KEY_ENTER
    ("escape", 1),       // KEY_ESC
    ("backspace", 14),   // KEY_BACKSPACE
    ("tab", 15),         // KEY_TAB
    ("capslock", 58),    // KEY_CAPSLOCK

    // Стрелки
    ("up", 103), ("down", 108), ("left", 105), ("right", 106),

    // Функциональные клавиши
    ("f1", 59), ("f2", 60), ("f3", 61), ("f4", 62), ("f5", 63), ("f6", 64),
    ("f7", 65), ("f8", 66), ("f9", 67), ("f10", 68), ("f11", 87), ("f12", 88),
];

/// Синонимы для модификаторов (всегда левая клавиша)
const KEYBOARD_ALIASES: &[(&str, &str)] = &[
    ("alt", "leftalt"),
    ("ctrl", "leftctrl"),
    ("shift", "leftshift"),
    ("super", "leftmeta"),
];

/// Кнопки мыши: имя -> evdev код (BTN_*)
const MOUSE: &[(&str, u16)] = &[
    ("left", 0x110),    // BTN_LEFT
    ("right", 0x111),   // BTN_RIGHT
    ("middle", 0x112),  // BTN_MIDDLE
    ("side", 0x113),    // BTN_SIDE, кнопка 4 ("назад")
    ("extra", 0x114),   // BTN_EXTRA, кнопка 5 ("вперёд")
    ("forward", 0x115), // BTN_FORWARD
    ("back", 0x116),    // BTN_BACK
];

impl KeyNameToEvdevCode {
    /// Получить evdev код клавиатурной клавиши по её имени
    pub fn translate(key_name: &str) -> Result<u16, String> {
        let normalized = key_name.trim().to_lowercase();
        let canonical = KEYBOARD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, name)| *name)
            .unwrap_or(normalized.as_str());

        KEYBOARD
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, code)| *code)
            .ok_or_else(|| format!("Unknown key: {}", key_name))
    }

    /// Получить evdev код кнопки мыши по имени (`extra` или `btn_extra`)
    pub fn translate_mouse_button(button_name: &str) -> Result<u16, String> {
        let normalized = button_name.trim().to_lowercase();
        let name = normalized.strip_prefix("btn_").unwrap_or(&normalized);

        MOUSE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, code)| *code)
            .ok_or_else(|| format!("Unknown mouse button: {}", button_name))
    }

    /// Получить имя по evdev коду. Кнопки мыши возвращаются с префиксом `btn_`.
    pub fn reverse_translate(keycode: u16) -> Option<&'static str> {
        if let Some((name, _)) = KEYBOARD.iter().find(|(_, code)| *code == keycode) {
            return Some(name);
        }

        match keycode {
            0x110 => Some("btn_left"),
            0x111 => Some("btn_right"),
            0x112 => Some("btn_middle"),
            0x113 => Some("btn_side"),
            0x114 => Some("btn_extra"),
            0x115 => Some("btn_forward"),
            0x116 => Some("btn_back"),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn is_mouse_button(keycode: u16) -> bool {
        MOUSE.iter().any(|(_, code)| *code == keycode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_key_mapping() {
        assert_eq!(KeyNameToEvdevCode::translate("a").unwrap(), 30);
        assert_eq!(KeyNameToEvdevCode::translate("space").unwrap(), 57);
        assert_eq!(KeyNameToEvdevCode::translate("leftalt").unwrap(), 56);
    }

    #[test]
    fn test_case_insensitive_and_aliases() {
        assert_eq!(KeyNameToEvdevCode::translate("A").unwrap(), 30);
        assert_eq!(KeyNameToEvdevCode::translate("LeftAlt").unwrap(), 56);
        assert_eq!(KeyNameToEvdevCode::translate("alt").unwrap(), 56);
        assert_eq!(KeyNameToEvdevCode::translate("super").unwrap(), 125);
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(KeyNameToEvdevCode::translate_mouse_button("left").unwrap(), 0x110);
        assert_eq!(KeyNameToEvdevCode::translate_mouse_button("extra").unwrap(), 0x114);
        assert_eq!(KeyNameToEvdevCode::translate_mouse_button("BTN_SIDE").unwrap(), 0x113);
        assert!(KeyNameToEvdevCode::translate_mouse_button("leftalt").is_err());
        assert!(KeyNameToEvdevCode::is_mouse_button(0x114));
        assert!(!KeyNameToEvdevCode::is_mouse_button(56));
    }

    #[test]
    fn test_reverse_mapping() {
        assert_eq!(KeyNameToEvdevCode::reverse_translate(30), Some("a"));
        assert_eq!(KeyNameToEvdevCode::reverse_translate(105), Some("left"));
        assert_eq!(KeyNameToEvdevCode::reverse_translate(0x110), Some("btn_left"));
        assert_eq!(KeyNameToEvdevCode::reverse_translate(0x2ff), None);
    }

    #[test]
    fn test_invalid_key() {
        assert!(KeyNameToEvdevCode::translate("invalid_key").is_err());
        assert!(KeyNameToEvdevCode::translate("extra").is_err());
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(KeyNameToEvdevCode::translate("f1").unwrap(), 59);
        assert_eq!(KeyNameToEvdevCode::translate("F12").unwrap(), 88);
        assert_eq!(KeyNameToEvdevCode::reverse_translate(88), Some("f12"));
    }
}

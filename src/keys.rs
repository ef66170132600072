use std::borrow::Cow;


/// Returns a readable name for a Windows virtual-key code, as delivered in the `wParam` of a WH_KEYBOARD callback.
///
/// # See Also
/// - [Microsoft Virtual-Key Codes](https://learn.microsoft.com/en-us/windows/win32/inputdev/virtual-key-codes)
///
pub fn vk_name (vk: usize) -> Cow<'static, str> {
    match vk {
        // digits and letters share their ascii codes
        0x30 ..= 0x39 | 0x41 ..= 0x5A => Cow::Owned ((vk as u8 as char).to_string()),

        0x60 ..= 0x69 => Cow::Owned (format! ("Numpad_{}", vk - 0x60)),
        0x70 ..= 0x87 => Cow::Owned (format! ("F{}", vk - 0x70 + 1)),

        _ => named_vk (vk) .map (Cow::Borrowed) .unwrap_or_else (|| Cow::Owned (format! ("0x{:02X}", vk))),
    }
}


fn named_vk (vk: usize) -> Option<&'static str> {
    let name = match vk {
        0x08 => "Back",
        0x09 => "Tab",
        0x0C => "Clear",
        0x0D => "Return",

        0x10 => "Shift",
        0x11 => "Ctrl",
        0x12 => "Alt",
        0x13 => "Pause",
        0x14 => "CapsLock",

        0x1B => "Escape",
        0x20 => "Space",
        0x21 => "PgUp",
        0x22 => "PgDown",
        0x23 => "End",
        0x24 => "Home",
        0x25 => "Left",
        0x26 => "Up",
        0x27 => "Right",
        0x28 => "Down",

        0x29 => "Select",
        0x2A => "Print",
        0x2B => "Execute",
        0x2C => "Snapshot",
        0x2D => "Insert",
        0x2E => "Delete",
        0x2F => "Help",

        0x5B => "LWin",
        0x5C => "RWin",
        0x5D => "Apps",
        0x5F => "Sleep",

        0x6A => "Multiply",
        0x6B => "Add",
        0x6C => "Separator",
        0x6D => "Subtract",
        0x6E => "Decimal",
        0x6F => "Divide",

        0x90 => "NumLock",
        0x91 => "ScrollLock",

        0xA0 => "LShift",
        0xA1 => "RShift",
        0xA2 => "LCtrl",
        0xA3 => "RCtrl",
        0xA4 => "LAlt",
        0xA5 => "RAlt",

        0xAD => "VolumeMute",
        0xAE => "VolumeDown",
        0xAF => "VolumeUp",
        0xB0 => "MediaNextTrack",
        0xB1 => "MediaPrevTrack",
        0xB2 => "MediaStop",
        0xB3 => "MediaPlayPause",

        0xBA => "SemiColon",
        0xBB => "Equal",
        0xBC => "Comma",
        0xBD => "Minus",
        0xBE => "Period",
        0xBF => "Slash",
        0xC0 => "Backquote",
        0xDB => "LBracket",
        0xDC => "Backslash",
        0xDD => "RBracket",
        0xDE => "Quote",

        _ => return None,
    };
    Some (name)
}





#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits() {
        assert_eq!(vk_name(0x41), "A");
        assert_eq!(vk_name(0x5A), "Z");
        assert_eq!(vk_name(0x30), "0");
        assert_eq!(vk_name(0x39), "9");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(vk_name(0x70), "F1");
        assert_eq!(vk_name(0x7B), "F12");
        assert_eq!(vk_name(0x87), "F24");
        assert_eq!(vk_name(0x60), "Numpad_0");
        assert_eq!(vk_name(0x69), "Numpad_9");
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(vk_name(0x08), "Back");
        assert_eq!(vk_name(0x0D), "Return");
        assert_eq!(vk_name(0x20), "Space");
        assert_eq!(vk_name(0xA2), "LCtrl");
        assert_eq!(vk_name(0xDC), "Backslash");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(vk_name(0x07), "0x07");
        assert_eq!(vk_name(0xFF), "0xFF");
        assert_eq!(vk_name(0x1234), "0x1234");
    }
}

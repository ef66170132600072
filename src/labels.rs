//! Sub-code labels for the hook kinds that carry one.
//!
//! The set of codes the OS may hand us is open-ended, so every table ends in an explicit fallback.

use std::borrow::Cow;


pub const UNKNOWN : &str = "Unknown";


/// Label for the `nCode` of a WH_CBT callback
pub fn cbt_code_label (code: i32) -> &'static str {
    match code {
        0 => "HCBT_MOVESIZE",
        1 => "HCBT_MINMAX",
        2 => "HCBT_QS",
        3 => "HCBT_CREATEWND",
        4 => "HCBT_DESTROYWND",
        5 => "HCBT_ACTIVATE",
        6 => "HCBT_CLICKSKIPPED",
        7 => "HCBT_KEYSKIPPED",
        8 => "HCBT_SYSCOMMAND",
        9 => "HCBT_SETFOCUS",
        _ => UNKNOWN,
    }
}

/// Label for the remove-flag (`wParam`) of a WH_GETMESSAGE callback
pub fn peek_remove_label (wparam: usize) -> &'static str {
    match wparam {
        0 => "PM_NOREMOVE",
        1 => "PM_REMOVE",
        _ => UNKNOWN,
    }
}

/// Label for the filter source (`nCode`) of a WH_MSGFILTER callback .. the fallback carries the raw code
pub fn msg_filter_label (code: i32) -> Cow<'static, str> {
    match code {
        0 => Cow::Borrowed ("MSGF_DIALOGBOX"),
        2 => Cow::Borrowed ("MSGF_MENU"),
        5 => Cow::Borrowed ("MSGF_SCROLLBAR"),
        _ => Cow::Owned (format! ("{}: {}", UNKNOWN, code)),
    }
}

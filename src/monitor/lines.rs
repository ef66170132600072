use std::borrow::Cow;
use thiserror::Error;

use crate::keys::vk_name;
use crate::labels::{cbt_code_label, msg_filter_label, peek_remove_label, UNKNOWN};
use crate::messages::message_name;
use crate::monitor::{EventDetail, EventRecord};
use crate::types::HookKind;



#[derive (Error, Debug, PartialEq)]
pub enum LineError {
    #[error("{kind} line of {len} chars exceeds its {capacity} char capacity")]
    TooLong { kind: HookKind, len: usize, capacity: usize },
}


/// Knobs that change what goes into a line (but never its layout)
# [ derive (Debug, Default, Copy, Clone) ]
pub struct LineOptions {
    pub key_names : bool,
    pub max_chars : Option<usize>,
    // ^^ can only tighten the per-kind capacity, never widen it
}

impl LineOptions {
    pub fn capacity (&self, kind: HookKind) -> usize {
        self.max_chars .map_or (kind.line_capacity(), |m| m.min (kind.line_capacity()))
    }
}


fn msg_label (record: &EventRecord) -> Cow<'static, str> {
    match record.detail {
        EventDetail::Message(msg) | EventDetail::Mouse { msg, .. } => message_name (msg),
        EventDetail::None => Cow::Borrowed (UNKNOWN),
    }
}


/// Composes the status line for one actionable event, with `count` being the pre-increment counter value
pub fn compose_line (kind: HookKind, record: &EventRecord, count: u32, opts: LineOptions) -> Result<String, LineError> {
    let code   = record.code;
    let wparam = record.wparam;

    let line = match kind {
        HookKind::CallWndProc => format! (
            "CALLWNDPROC - tsk: {}, msg: {}, {} times   ", wparam, msg_label(record), count
        ),
        HookKind::GetMessage => format! (
            "GETMESSAGE - wParam: {}, msg: {}, {} times   ", peek_remove_label(wparam), msg_label(record), count
        ),
        HookKind::Debug => format! (
            "DEBUG - nCode: {}, tsk: {}, {} times   ", code, wparam, count
        ),
        HookKind::Cbt => format! (
            "CBT -  nCode: {}, tsk: {}, {} times   ", cbt_code_label(code), wparam, count
        ),
        HookKind::Mouse => {
            let (x, y) = record.detail.point().unwrap_or_default();
            format! ("MOUSE - nCode: {}, msg: {}, x: {}, y: {}, {} times   ", code, msg_label(record), x, y, count)
        }
        HookKind::Keyboard => {
            if opts.key_names {
                format! ("KEYBOARD - nCode: {}, vk: {} ({}), {} times ", code, wparam, vk_name(wparam), count)
            } else {
                format! ("KEYBOARD - nCode: {}, vk: {}, {} times ", code, wparam, count)
            }
        }
        HookKind::MsgFilter => format! (
            "MSGFILTER  nCode: {}, msg: {}, {} times    ", msg_filter_label(code), msg_label(record), count
        ),
    };

    let len = line.chars().count();
    let capacity = opts.capacity(kind);
    if len > capacity {
        return Err ( LineError::TooLong { kind, len, capacity } )
    }
    Ok (line)
}

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetDC, ReleaseDC, TextOutW};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, CWPSTRUCT, HHOOK, MOUSEHOOKSTRUCT, MSG, WINDOWS_HOOK_ID};

use crate::monitor::{EventDetail, EventRecord, HookBackend, HookError, HookHost, HostCell, Surface, SurfaceError};
use crate::types::{HookKind, Hwnd};
use crate::win_utils::{last_error_string, wide_chars};



//  ~~~ Thread Affinity Reminder ~~~
// .. All hooks here are installed for the UI thread only (GetCurrentThreadId), so every callback runs on the same thread
// that owns the window, and the host cell below is thread-local rather than shared.



/// The real hook api .. zero-sized, all the state lives in the monitor's registry
# [ derive (Debug, Default, Copy, Clone) ]
pub struct Win32Hooks;

impl HookBackend for Win32Hooks {
    type Handle = HHOOK;

    fn install (&mut self, kind: HookKind) -> Result<HHOOK, HookError> { unsafe {
        SetWindowsHookExW (WINDOWS_HOOK_ID (kind.hook_id()), Some (hook_proc_for (kind)), None, GetCurrentThreadId())
            .map_err (|e| HookError::InstallFailed { kind, reason: e.message() })
    } }

    fn uninstall (&mut self, kind: HookKind, handle: HHOOK) -> Result<(), HookError> { unsafe {
        UnhookWindowsHookEx (handle) .map_err (|e| HookError::UninstallFailed { kind, reason: e.message() })
    } }

    fn call_next (&self, handle: Option<HHOOK>, record: &EventRecord) -> isize { unsafe {
        CallNextHookEx (handle, record.code, WPARAM (record.wparam), LPARAM (record.lparam)) .0
    } }
}



/// Draws into the client area of our main window, grabbing and releasing its DC around every line
# [ derive (Debug, Default, Copy, Clone) ]
pub struct WindowSurface {
    pub hwnd : Hwnd,
}

impl Surface for WindowSurface {
    fn draw_line (&mut self, x: i32, y: i32, text: &str) -> Result<(), SurfaceError> { unsafe {
        if !self.hwnd.is_valid() { return Err (SurfaceError::Unavailable) }
        let hwnd : HWND = self.hwnd.into();
        let hdc = GetDC (Some(hwnd));
        if hdc.is_invalid() { return Err (SurfaceError::Unavailable) }
        let drawn = TextOutW (hdc, x, y, &wide_chars(text)) .as_bool();
        let err = if drawn { None } else { Some (last_error_string()) };
        ReleaseDC (Some(hwnd), hdc);
        err .map_or (Ok(()), |e| Err (SurfaceError::DrawFailed(e)))
    } }
}



pub type WinHookHost = HookHost <Win32Hooks, WindowSurface>;

thread_local! {
    static HOST : HostCell <Win32Hooks, WindowSurface> = const { HostCell::new() };
}

pub fn attach (host: WinHookHost) {
    let _ = HOST.try_with (|h| h.attach (host));
}

pub fn detach () -> Option<WinHookHost> {
    HOST.try_with (|h| h.detach()) .ok() .flatten()
}

pub fn with_host <R> (f: impl FnOnce (&mut WinHookHost) -> R) -> Option<R> {
    HOST.try_with (|h| h.with_host (f)) .ok() .flatten()
}



/// Pulls the kind-specific bits out of the payload .. only valid to call for actionable codes
unsafe fn read_detail (kind: HookKind, wparam: WPARAM, lparam: LPARAM) -> EventDetail {
    if lparam.0 == 0 { return EventDetail::None }
    match kind {
        HookKind::CallWndProc => {
            let cwp = &*(lparam.0 as *const CWPSTRUCT);
            EventDetail::Message (cwp.message)
        }
        HookKind::GetMessage | HookKind::MsgFilter => {
            let msg = &*(lparam.0 as *const MSG);
            EventDetail::Message (msg.message)
        }
        HookKind::Mouse => {
            // for WH_MOUSE the message id rides in wParam, and the position in the hook struct
            let mhs = &*(lparam.0 as *const MOUSEHOOKSTRUCT);
            EventDetail::Mouse { msg: wparam.0 as u32, x: mhs.pt.x, y: mhs.pt.y }
        }
        HookKind::Cbt | HookKind::Debug | HookKind::Keyboard => EventDetail::None,
    }
}


fn on_hook_event (kind: HookKind, code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let detail = if kind.is_actionable (code) { unsafe { read_detail (kind, wparam, lparam) } } else { EventDetail::None };
    let record = EventRecord { code, wparam: wparam.0, lparam: lparam.0, detail };

    // with the thread-local already torn down we still must not swallow the event
    LRESULT ( HOST.try_with (|h| h.dispatch (kind, &record, &Win32Hooks))
        .unwrap_or_else (|_| Win32Hooks.call_next (None, &record)) )
}


unsafe extern "system" fn call_wnd_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::CallWndProc, code, wparam, lparam)
}
unsafe extern "system" fn cbt_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::Cbt, code, wparam, lparam)
}
unsafe extern "system" fn debug_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::Debug, code, wparam, lparam)
}
unsafe extern "system" fn get_msg_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::GetMessage, code, wparam, lparam)
}
unsafe extern "system" fn keyboard_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::Keyboard, code, wparam, lparam)
}
unsafe extern "system" fn mouse_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::Mouse, code, wparam, lparam)
}
unsafe extern "system" fn msg_filter_proc (code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    on_hook_event (HookKind::MsgFilter, code, wparam, lparam)
}

type HookProcFn = unsafe extern "system" fn (i32, WPARAM, LPARAM) -> LRESULT;

fn hook_proc_for (kind: HookKind) -> HookProcFn {
    match kind {
        HookKind::CallWndProc => call_wnd_proc,
        HookKind::Cbt         => cbt_proc,
        HookKind::Debug       => debug_proc,
        HookKind::GetMessage  => get_msg_proc,
        HookKind::Keyboard    => keyboard_proc,
        HookKind::Mouse       => mouse_proc,
        HookKind::MsgFilter   => msg_filter_proc,
    }
}

use itertools::Itertools;
use thiserror::Error;
use tracing::{info, warn};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{GetLastError, ERROR_CLASS_ALREADY_EXISTS, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetSysColorBrush, UpdateWindow, COLOR_WINDOW};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CheckMenuItem, CreateMenu, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMenu, GetMessageW, LoadCursorW, MessageBeep, PostQuitMessage, RegisterClassExW, ShowWindow, TranslateMessage,
    CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, HICON, HMENU, IDC_ARROW, MB_ICONWARNING, MF_BYCOMMAND, MF_CHECKED, MF_POPUP,
    MF_SEPARATOR, MF_STRING, MF_UNCHECKED, MSG, SW_SHOW, WINDOW_EX_STYLE, WM_COMMAND, WM_DESTROY, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
};

use crate::config::Config;
use crate::monitor::{HookHost, HookMonitor};
use crate::types::{HookKind, MenuCommand};
use crate::win_hooks::{self, WindowSurface, Win32Hooks};
use crate::win_utils::{last_error_string, wide_string};



#[derive (Error, Debug)]
pub enum AppError {
    #[error("{call} failed: {reason}")]
    Win32 { call: &'static str, reason: String },
}

fn win32_err (call: &'static str) -> impl Fn (windows::core::Error) -> AppError {
    move |e| AppError::Win32 { call, reason: e.message() }
}



const MAIN_WINDOW_CLASS_NAME : &str = "HookWatchMainWindowClass";



pub fn run (conf: &'static Config) -> Result<(), AppError> { unsafe {

    let _ = SetProcessDpiAwarenessContext (DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);

    let instance = GetModuleHandleW(None) .map_err (win32_err("GetModuleHandleW"))?;

    let class_name = wide_string (MAIN_WINDOW_CLASS_NAME);
    let wc = WNDCLASSEXW {
        cbSize: size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(main_window_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: instance.into(),
        hIcon: HICON::default(),
        hCursor: LoadCursorW (None, IDC_ARROW) .unwrap_or_default(),
        hbrBackground: GetSysColorBrush (COLOR_WINDOW),
        lpszMenuName: PCWSTR::null(),
        lpszClassName: PCWSTR::from_raw (class_name.as_ptr()),
        hIconSm: HICON::default(),
    };
    if RegisterClassExW (&wc) == 0 {
        if GetLastError() != ERROR_CLASS_ALREADY_EXISTS {
            return Err (AppError::Win32 { call: "RegisterClassExW", reason: last_error_string() });
        }
    }

    let menu = build_menu()?;

    let title = wide_string (&conf.get_window_title());
    let (width, height) = conf.get_window_size();

    let hwnd = CreateWindowExW (
        WINDOW_EX_STYLE::default(),
        PCWSTR::from_raw (class_name.as_ptr()),
        PCWSTR::from_raw (title.as_ptr()),
        WS_OVERLAPPEDWINDOW, CW_USEDEFAULT, CW_USEDEFAULT, width, height,
        None, Some(menu), Some(instance.into()), None
    ) .map_err (win32_err("CreateWindowExW"))?;

    win_hooks::attach ( HookHost {
        monitor : HookMonitor::new (Win32Hooks, conf.get_line_layout(), conf.get_line_options()),
        surface : WindowSurface { hwnd: hwnd.into() },
    } );

    let startup_kinds = conf.get_hooks_installed_at_startup();
    if !startup_kinds.is_empty() {
        info! ("Installing startup hooks : {}", startup_kinds.iter().join(", "));
        for kind in startup_kinds {
            match win_hooks::with_host (|host| host.monitor.install(kind)) {
                Some(Ok(()))  => set_menu_check (hwnd, kind, true),
                Some(Err(e))  => warn! ("{}", e),
                None => { }
            }
        }
    }

    let _ = ShowWindow (hwnd, SW_SHOW);
    let _ = UpdateWindow (hwnd);

    // finally we just babysit the message loop till the window goes away
    let mut msg = MSG::default();
    loop {
        let ret = GetMessageW (&mut msg, None, 0, 0);
        if ret.0 == -1 {
            win_hooks::detach();
            return Err (AppError::Win32 { call: "GetMessageW", reason: last_error_string() });
        }
        if ret.0 == 0 { break }
        let _ = TranslateMessage (&msg);
        DispatchMessageW (&msg);
    }

    win_hooks::detach();
    info! ("HookWatch main window closed, exiting");
    Ok(())
} }



unsafe fn build_menu () -> Result<HMENU, AppError> {
    let file_menu = CreatePopupMenu() .map_err (win32_err("CreatePopupMenu"))?;
    AppendMenuW (file_menu, MF_STRING, MenuCommand::EditConfig.id() as usize, w!("&Edit Config"))  .map_err (win32_err("AppendMenuW"))?;
    AppendMenuW (file_menu, MF_STRING, MenuCommand::ResetConfig.id() as usize, w!("&Reset Config")) .map_err (win32_err("AppendMenuW"))?;
    AppendMenuW (file_menu, MF_SEPARATOR, 0, PCWSTR::null()) .map_err (win32_err("AppendMenuW"))?;
    AppendMenuW (file_menu, MF_STRING, MenuCommand::Exit.id() as usize, w!("E&xit")) .map_err (win32_err("AppendMenuW"))?;

    let hooks_menu = CreatePopupMenu() .map_err (win32_err("CreatePopupMenu"))?;
    for kind in HookKind::ALL {
        let label = wide_string (kind.menu_label());
        AppendMenuW (hooks_menu, MF_STRING, MenuCommand::toggle_id(kind) as usize, PCWSTR::from_raw (label.as_ptr()))
            .map_err (win32_err("AppendMenuW"))?;
    }

    let menu_bar = CreateMenu() .map_err (win32_err("CreateMenu"))?;
    AppendMenuW (menu_bar, MF_POPUP, file_menu.0 as usize, w!("&File"))   .map_err (win32_err("AppendMenuW"))?;
    AppendMenuW (menu_bar, MF_POPUP, hooks_menu.0 as usize, w!("&Hooks")) .map_err (win32_err("AppendMenuW"))?;
    Ok (menu_bar)
}


fn set_menu_check (hwnd: HWND, kind: HookKind, checked: bool) { unsafe {
    let flags = MF_BYCOMMAND | if checked { MF_CHECKED } else { MF_UNCHECKED };
    CheckMenuItem (GetMenu(hwnd), MenuCommand::toggle_id(kind) as u32, flags.0);
} }


fn toggle_hook (hwnd: HWND, kind: HookKind) {
    match win_hooks::with_host (|host| host.monitor.toggle(kind)) {
        Some(Ok(installed)) => set_menu_check (hwnd, kind, installed),
        Some(Err(e)) => {
            // the slot is untouched on failure, so the check mark stays as it was
            warn! ("{}", e);
            let _ = unsafe { MessageBeep (MB_ICONWARNING) };
        }
        None => warn! ("Hook monitor busy or gone .. ignoring toggle of {}", kind),
    }
}


fn handle_menu_command (hwnd: HWND, cmd: MenuCommand) {
    let conf = Config::instance();
    match cmd {
        MenuCommand::Toggle(kind) => toggle_hook (hwnd, kind),
        MenuCommand::EditConfig   => conf.trigger_config_file_edit(),
        MenuCommand::ResetConfig  => {
            conf.trigger_config_file_reset();
            conf.reload_log_level();
            info! ("Config reset to defaults .. layout changes apply on next start");
        }
        MenuCommand::Exit => {
            let _ = unsafe { DestroyWindow (hwnd) };
        }
    }
}


unsafe extern "system" fn main_window_proc (
    hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_COMMAND => {
            match MenuCommand::from_id ((wparam.0 & 0xFFFF) as u16) {
                Some(cmd) => { handle_menu_command (hwnd, cmd); LRESULT(0) }
                None => DefWindowProcW (hwnd, msg, wparam, lparam),
            }
        }
        WM_DESTROY => {
            win_hooks::with_host (|host| host.monitor.uninstall_all());
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW (hwnd, msg, wparam, lparam), // Default handling for other messages
    }
}

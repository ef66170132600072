//! The hook monitor: a registry of per-kind hook slots, plus the one callback template all seven hook kinds share.
//!
//! Nothing in here talks to the OS directly .. installing/forwarding goes through a [`HookBackend`] and drawing
//! goes through a [`Surface`], which lets the whole toggle/render/forward flow run (and be tested) off-windows.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::types::HookKind;

pub use host::{HookHost, HostCell};
pub use lines::{compose_line, LineOptions};
use registry::HookRegistry;

mod host;
mod lines;
mod registry;



#[derive (Error, Debug)]
pub enum HookError {
    #[error("Installing {kind} hook failed: {reason}")]
    InstallFailed { kind: HookKind, reason: String },
    #[error("Removing {kind} hook failed: {reason}")]
    UninstallFailed { kind: HookKind, reason: String },
}

#[derive (Error, Debug)]
pub enum SurfaceError {
    #[error("No drawing surface available")]
    Unavailable,
    #[error("Drawing text failed: {0}")]
    DrawFailed (String),
}



/// The OS side of hooking .. acquire/release handles and pass events down the chain
pub trait HookBackend {
    type Handle : Copy + fmt::Debug;

    /// installs a hook of this kind bound to the calling thread
    fn install (&mut self, kind: HookKind) -> Result<Self::Handle, HookError>;

    fn uninstall (&mut self, kind: HookKind, handle: Self::Handle) -> Result<(), HookError>;

    /// hands the event to the next hook in the chain and returns its result
    fn call_next (&self, handle: Option<Self::Handle>, record: &EventRecord) -> isize;
}


/// Something we can put a line of text on. Implementations acquire and release whatever they draw on per call.
pub trait Surface {
    fn draw_line (&mut self, x: i32, y: i32, text: &str) -> Result<(), SurfaceError>;
}



/// What we decoded out of an event payload .. which flavor depends on the hook kind
# [ derive (Debug, Default, Copy, Clone, Eq, PartialEq) ]
pub enum EventDetail {
    #[default]
    None,
    Message (u32),
    Mouse { msg: u32, x: i32, y: i32 },
}

impl EventDetail {
    pub fn point (&self) -> Option<(i32, i32)> {
        match *self {
            EventDetail::Mouse { x, y, .. } => Some ((x, y)),
            _ => None,
        }
    }
}


/// One callback invocation's worth of input. Only lives for the duration of that call.
# [ derive (Debug, Default, Copy, Clone, Eq, PartialEq) ]
pub struct EventRecord {
    pub code   : i32,
    pub wparam : usize,
    pub lparam : isize,
    // ^^ raw values are kept as-is so forwarding passes on exactly what we got
    pub detail : EventDetail,
}



/// Where each kind's line goes in the client area
# [ derive (Debug, Copy, Clone, Eq, PartialEq) ]
pub struct LineLayout {
    pub left : i32,
    rows     : [i32; 7],
}

impl Default for LineLayout {
    fn default () -> Self {
        LineLayout { left: 2, rows: HookKind::ALL.map (|k| k.default_row()) }
    }
}

impl LineLayout {

    /// applies row overrides on top of the defaults .. falls back to default rows entirely if any two kinds would collide
    pub fn new (left: i32, overrides: &[(HookKind, i32)]) -> Self {
        let mut rows = HookKind::ALL.map (|k| k.default_row());
        for &(kind, row) in overrides {
            rows [kind.slot()] = row;
        }
        let mut sorted = rows;
        sorted.sort_unstable();
        if sorted.windows(2).any (|w| w[0] == w[1]) {
            warn! ("Configured hook rows {:?} overlap .. using default rows instead", rows);
            rows = HookKind::ALL.map (|k| k.default_row());
        }
        LineLayout { left, rows }
    }

    pub fn row (&self, kind: HookKind) -> i32 {
        self.rows [kind.slot()]
    }
}



/// What a single callback invocation ended up doing (forwarding aside, which always happens)
# [ derive (Debug, Clone, Eq, PartialEq) ]
pub enum Observation {
    Declined,
    Rendered (String),
    Skipped,
}



pub struct HookMonitor <B: HookBackend> {
    backend  : B,
    registry : HookRegistry <B::Handle>,
    layout   : LineLayout,
    opts     : LineOptions,
}

impl <B: HookBackend> HookMonitor <B> {

    pub fn new (backend: B, layout: LineLayout, opts: LineOptions) -> Self {
        HookMonitor { backend, registry: HookRegistry::new(), layout, opts }
    }

    pub fn is_installed (&self, kind: HookKind) -> bool {
        self.registry.slot(kind).is_installed()
    }
    pub fn installed_kinds (&self) -> Vec<HookKind> {
        self.registry.installed_kinds()
    }
    pub fn count (&self, kind: HookKind) -> u32 {
        self.registry.slot(kind).counter.get()
    }
    #[cfg(test)]
    pub fn backend (&self) -> &B {
        &self.backend
    }


    /// Flips the installed state of a hook kind and returns the new state.
    /// On failure the slot is left exactly as it was.
    pub fn toggle (&mut self, kind: HookKind) -> Result<bool, HookError> {
        if self.is_installed(kind) {
            self.uninstall(kind)?;
            Ok(false)
        } else {
            self.install(kind)?;
            Ok(true)
        }
    }

    pub fn install (&mut self, kind: HookKind) -> Result<(), HookError> {
        if self.is_installed(kind) { return Ok(()) }
        let handle = self.backend.install(kind)?;
        self.registry.store_handle (kind, handle);
        info! ("Installed {} hook .. {:?}", kind, handle);
        Ok(())
    }

    pub fn uninstall (&mut self, kind: HookKind) -> Result<(), HookError> {
        let Some(handle) = self.registry.handle(kind) else { return Ok(()) };
        self.backend.uninstall (kind, handle)?;
        self.registry.take_handle(kind);
        info! ("Removed {} hook .. {:?}", kind, handle);
        Ok(())
    }

    /// releases every active hook .. slots get cleared even when the release fails, as the owning window is going away
    pub fn uninstall_all (&mut self) {
        for kind in self.registry.installed_kinds() {
            if let Some(handle) = self.registry.take_handle(kind) {
                match self.backend.uninstall (kind, handle) {
                    Ok(()) => info! ("Removed {} hook .. {:?}", kind, handle),
                    Err(e) => warn! ("{}", e),
                }
            }
        }
    }


    /// The shared callback body: render if the code is actionable, then always forward down the chain.
    pub fn dispatch (&mut self, kind: HookKind, record: &EventRecord, surface: &mut impl Surface) -> isize {
        let _ = self.observe (kind, record, surface);
        self.backend.call_next (self.registry.handle(kind), record)
    }

    /// the render half of [`Self::dispatch`] .. never forwards by itself
    pub fn observe (&mut self, kind: HookKind, record: &EventRecord, surface: &mut impl Surface) -> Observation {
        if !kind.is_actionable (record.code) {
            return Observation::Declined
        }
        let counter = &mut self.registry.slot_mut(kind).counter;

        let line = match compose_line (kind, record, counter.get(), self.opts) {
            Ok(line) => line,
            Err(e) => {
                warn! ("Skipping render: {}", e);
                return Observation::Skipped
            }
        };
        counter.bump();

        if let Err(e) = surface.draw_line (self.layout.left, self.layout.row(kind), &line) {
            debug! ("{} line not drawn: {}", kind, e);
        }
        trace! ("{}", line.trim_end());
        Observation::Rendered (line)
    }
}





#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive (Default)]
    struct MockBackend {
        next_handle : u32,
        live        : Vec<u32>,
        installs    : usize,
        uninstalls  : usize,
        forwarded   : Rc <RefCell <Vec <(Option<u32>, EventRecord)>>>,
        fail_install   : Option<HookKind>,
        fail_uninstall : Option<HookKind>,
    }

    impl HookBackend for MockBackend {
        type Handle = u32;
        fn install (&mut self, kind: HookKind) -> Result<u32, HookError> {
            if self.fail_install == Some(kind) {
                return Err (HookError::InstallFailed { kind, reason: "mock refused".into() })
            }
            self.next_handle += 1;
            self.installs += 1;
            self.live.push (self.next_handle);
            Ok (self.next_handle)
        }
        fn uninstall (&mut self, kind: HookKind, handle: u32) -> Result<(), HookError> {
            if self.fail_uninstall == Some(kind) {
                return Err (HookError::UninstallFailed { kind, reason: "mock refused".into() })
            }
            let Some(pos) = self.live.iter().position (|h| *h == handle) else {
                return Err (HookError::UninstallFailed { kind, reason: "no such handle".into() })
            };
            self.live.remove(pos);
            self.uninstalls += 1;
            Ok(())
        }
        fn call_next (&self, handle: Option<u32>, record: &EventRecord) -> isize {
            self.forwarded.borrow_mut().push ((handle, *record));
            77
        }
    }

    #[derive (Default)]
    struct RecordingSurface {
        lines : Vec <(i32, i32, String)>,
    }
    impl Surface for RecordingSurface {
        fn draw_line (&mut self, x: i32, y: i32, text: &str) -> Result<(), SurfaceError> {
            self.lines.push ((x, y, text.to_string()));
            Ok(())
        }
    }

    struct BrokenSurface;
    impl Surface for BrokenSurface {
        fn draw_line (&mut self, _x: i32, _y: i32, _text: &str) -> Result<(), SurfaceError> {
            Err (SurfaceError::Unavailable)
        }
    }

    fn monitor () -> HookMonitor<MockBackend> {
        HookMonitor::new (MockBackend::default(), LineLayout::default(), LineOptions::default())
    }

    fn rec (code: i32, wparam: usize, detail: EventDetail) -> EventRecord {
        EventRecord { code, wparam, lparam: 0x1234, detail }
    }


    #[test]
    fn test_toggle_twice_restores_every_kind() {
        let mut m = monitor();
        for kind in HookKind::ALL {
            assert_eq!(m.toggle(kind).unwrap(), true);
            assert!(m.is_installed(kind));
            assert_eq!(m.toggle(kind).unwrap(), false);
            assert!(!m.is_installed(kind));
        }
        assert!(m.installed_kinds().is_empty());
        assert!(m.backend().live.is_empty());
        assert_eq!(m.backend().installs, 7);
        assert_eq!(m.backend().uninstalls, 7);
    }

    #[test]
    fn test_failed_install_leaves_state_unchanged() {
        let mut m = HookMonitor::new (
            MockBackend { fail_install: Some(HookKind::Debug), ..Default::default() },
            LineLayout::default(), LineOptions::default(),
        );
        assert!(matches!(m.toggle(HookKind::Debug), Err(HookError::InstallFailed { kind: HookKind::Debug, .. })));
        assert!(!m.is_installed(HookKind::Debug));
        assert!(m.toggle(HookKind::Cbt).unwrap());
        assert_eq!(m.installed_kinds(), vec![HookKind::Cbt]);
    }

    #[test]
    fn test_failed_uninstall_keeps_hook() {
        let mut m = HookMonitor::new (
            MockBackend { fail_uninstall: Some(HookKind::GetMessage), ..Default::default() },
            LineLayout::default(), LineOptions::default(),
        );
        assert!(m.toggle(HookKind::GetMessage).unwrap());
        assert!(matches!(m.toggle(HookKind::GetMessage), Err(HookError::UninstallFailed { kind: HookKind::GetMessage, .. })));
        assert!(m.is_installed(HookKind::GetMessage));

        let mut surface = RecordingSurface::default();
        m.dispatch(HookKind::GetMessage, &rec(0, 1, EventDetail::Message(0x0100)), &mut surface);
        assert_eq!(m.backend().forwarded.borrow()[0].0, Some(1));
    }

    #[test]
    fn test_uninstall_all_clears_slots_despite_release_failure() {
        let mut m = HookMonitor::new (
            MockBackend { fail_uninstall: Some(HookKind::Mouse), ..Default::default() },
            LineLayout::default(), LineOptions::default(),
        );
        for kind in [HookKind::Cbt, HookKind::Mouse] {
            m.toggle(kind).unwrap();
        }
        m.uninstall_all();
        assert!(m.installed_kinds().is_empty());
        assert!(!m.is_installed(HookKind::Mouse));
        assert_eq!(m.backend().uninstalls, 1);
        assert_eq!(m.backend().live, vec![2]);
    }

    #[test]
    fn test_declined_code_forwards_without_render() {
        let mut m = monitor();
        m.toggle(HookKind::Cbt).unwrap();
        let mut surface = RecordingSurface::default();
        let r = rec(-1, 5, EventDetail::None);
        assert_eq!(m.dispatch(HookKind::Cbt, &r, &mut surface), 77);
        assert!(surface.lines.is_empty());
        assert_eq!(m.count(HookKind::Cbt), 0);
        let fwd = m.backend().forwarded.borrow();
        assert_eq!(fwd.len(), 1);
        assert_eq!(fwd[0], (Some(1), r));
    }

    #[test]
    fn test_non_action_code_declined_for_action_only_kinds() {
        let mut m = monitor();
        let mut surface = RecordingSurface::default();
        for kind in [HookKind::CallWndProc, HookKind::GetMessage, HookKind::Debug] {
            assert_eq!(m.observe(kind, &rec(3, 0, EventDetail::Message(0x000F)), &mut surface), Observation::Declined);
            assert_eq!(m.count(kind), 0);
        }
        assert!(surface.lines.is_empty());
    }

    #[test]
    fn test_actionable_code_counts_once_per_invocation() {
        let mut m = monitor();
        let mut surface = RecordingSurface::default();
        for n in 0 .. 3 {
            m.dispatch(HookKind::Cbt, &rec(5, 0, EventDetail::None), &mut surface);
            assert_eq!(m.count(HookKind::Cbt), n + 1);
            assert!(surface.lines.last().unwrap().2.contains (&format!("{} times", n)));
        }
        assert_eq!(m.backend().forwarded.borrow().len(), 3);
        assert_eq!(m.count(HookKind::Mouse), 0);
    }

    #[test]
    fn test_mouse_scenario() {
        let mut m = monitor();
        m.toggle(HookKind::Mouse).unwrap();
        let mut surface = RecordingSurface::default();
        let r = rec(0, 0x0201, EventDetail::Mouse { msg: 0x0201, x: 10, y: 20 });
        m.dispatch(HookKind::Mouse, &r, &mut surface);

        assert_eq!(surface.lines.len(), 1);
        let (x, y, line) = &surface.lines[0];
        assert_eq!((*x, *y), (2, HookKind::Mouse.default_row()));
        assert!(line.contains("MOUSE"));
        assert!(line.contains("WM_LBUTTONDOWN"));
        assert!(line.contains("x: 10"));
        assert!(line.contains("y: 20"));
        assert!(line.contains("0 times"));
        assert_eq!(m.count(HookKind::Mouse), 1);
    }

    #[test]
    fn test_keyboard_on_off_without_events() {
        let mut m = monitor();
        m.toggle(HookKind::Keyboard).unwrap();
        m.toggle(HookKind::Keyboard).unwrap();
        assert!(!m.is_installed(HookKind::Keyboard));
        assert_eq!(m.count(HookKind::Keyboard), 0);
        assert!(m.backend().forwarded.borrow().is_empty());
    }

    #[test]
    fn test_too_long_line_is_skipped_but_forwarded() {
        let mut m = HookMonitor::new (
            MockBackend::default(), LineLayout::default(), LineOptions { max_chars: Some(10), ..Default::default() }
        );
        let mut surface = RecordingSurface::default();
        assert_eq!(m.observe(HookKind::Debug, &rec(0, 1, EventDetail::None), &mut surface), Observation::Skipped);
        m.dispatch(HookKind::Debug, &rec(0, 1, EventDetail::None), &mut surface);
        assert!(surface.lines.is_empty());
        assert_eq!(m.count(HookKind::Debug), 0);
        assert_eq!(m.backend().forwarded.borrow().len(), 1);
    }

    #[test]
    fn test_draw_failure_is_not_fatal() {
        let mut m = monitor();
        let out = m.dispatch(HookKind::Keyboard, &rec(0, 0x41, EventDetail::None), &mut BrokenSurface);
        assert_eq!(out, 77);
        assert_eq!(m.count(HookKind::Keyboard), 1);
    }

    #[test]
    fn test_forwarding_uses_slot_handle() {
        let mut m = monitor();
        m.toggle(HookKind::Cbt).unwrap();
        m.toggle(HookKind::MsgFilter).unwrap();
        let mut surface = RecordingSurface::default();
        m.dispatch(HookKind::MsgFilter, &rec(2, 0, EventDetail::Message(0x0100)), &mut surface);
        m.dispatch(HookKind::Debug, &rec(0, 0, EventDetail::None), &mut surface);
        let fwd = m.backend().forwarded.borrow();
        assert_eq!(fwd[0].0, Some(2));
        assert_eq!(fwd[1].0, None);
    }

    #[test]
    fn test_counters_survive_reinstall() {
        let mut m = monitor();
        let mut surface = RecordingSurface::default();
        m.toggle(HookKind::Cbt).unwrap();
        m.dispatch(HookKind::Cbt, &rec(3, 0, EventDetail::None), &mut surface);
        m.toggle(HookKind::Cbt).unwrap();
        m.toggle(HookKind::Cbt).unwrap();
        m.dispatch(HookKind::Cbt, &rec(3, 0, EventDetail::None), &mut surface);
        assert_eq!(m.count(HookKind::Cbt), 2);
        assert!(surface.lines[1].2.contains("1 times"));
    }

    #[test]
    fn test_uninstall_all() {
        let mut m = monitor();
        for kind in [HookKind::Cbt, HookKind::Mouse, HookKind::Keyboard] {
            m.toggle(kind).unwrap();
        }
        m.uninstall_all();
        assert!(m.installed_kinds().is_empty());
        assert!(m.backend().live.is_empty());
    }

    #[test]
    fn test_rows_never_overlap() {
        let mut surface = RecordingSurface::default();
        let mut m = monitor();
        for kind in HookKind::ALL {
            m.observe(kind, &rec(0, 0, EventDetail::Message(0)), &mut surface);
        }
        let mut rows : Vec<i32> = surface.lines.iter().map(|l| l.1).collect();
        rows.sort();
        rows.dedup();
        assert_eq!(rows.len(), 7);
    }

    #[test]
    fn test_layout_overrides_and_collisions() {
        let layout = LineLayout::new (5, &[(HookKind::Mouse, 300)]);
        assert_eq!(layout.left, 5);
        assert_eq!(layout.row(HookKind::Mouse), 300);
        assert_eq!(layout.row(HookKind::Cbt), 75);

        let clash = LineLayout::new (2, &[(HookKind::Mouse, 15)]);
        assert_eq!(clash, LineLayout::default());
    }

    fn host_with (log: &Rc <RefCell <Vec <(Option<u32>, EventRecord)>>>) -> HostCell<MockBackend, RecordingSurface> {
        let mut m = HookMonitor::new (
            MockBackend { forwarded: Rc::clone(log), ..Default::default() }, LineLayout::default(), LineOptions::default()
        );
        m.toggle(HookKind::Cbt).unwrap();
        let cell = HostCell::new();
        cell.attach (HookHost { monitor: m, surface: RecordingSurface::default() });
        cell
    }

    #[test]
    fn test_host_dispatch_renders_and_forwards() {
        let log = Rc::default();
        let cell = host_with (&log);
        let idle = MockBackend { forwarded: Rc::clone(&log), ..Default::default() };
        let r = rec(3, 0, EventDetail::None);
        assert_eq!(cell.dispatch(HookKind::Cbt, &r, &idle), 77);
        assert_eq!(*log.borrow(), vec![(Some(1), r)]);
        let host = cell.detach().unwrap();
        assert_eq!(host.surface.lines.len(), 1);
        assert_eq!(host.monitor.count(HookKind::Cbt), 1);
    }

    #[test]
    fn test_busy_host_forwards_only() {
        let log = Rc::default();
        let cell = host_with (&log);
        let idle = MockBackend { forwarded: Rc::clone(&log), ..Default::default() };
        let r = rec(3, 0, EventDetail::None);

        // an event arriving while the host is already held, as when drawing triggers another hooked message
        let out = cell.with_host (|_held| cell.dispatch(HookKind::Cbt, &r, &idle));
        assert_eq!(out, Some(77));
        assert_eq!(*log.borrow(), vec![(None, r)]);

        let host = cell.detach().unwrap();
        assert!(host.surface.lines.is_empty());
        assert_eq!(host.monitor.count(HookKind::Cbt), 0);
    }

    #[test]
    fn test_empty_host_forwards_only() {
        let cell : HostCell<MockBackend, RecordingSurface> = HostCell::new();
        let idle = MockBackend::default();
        assert_eq!(cell.dispatch(HookKind::Mouse, &rec(0, 0x0200, EventDetail::None), &idle), 77);
        assert_eq!(idle.forwarded.borrow().len(), 1);
        assert!(cell.detach().is_none());
    }
}

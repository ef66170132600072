use std::cell::RefCell;

use tracing::trace;

use crate::monitor::{EventRecord, HookBackend, HookMonitor, Surface};
use crate::types::HookKind;



/// The monitor together with the surface its lines go to
pub struct HookHost <B: HookBackend, S: Surface> {
    pub monitor : HookMonitor <B>,
    pub surface : S,
}


/// Slot the hook callbacks reach the host through. Meant to live in a thread-local on the thread that owns the hooks.
pub struct HostCell <B: HookBackend, S: Surface> {
    host : RefCell <Option <HookHost <B, S>>>,
}

impl <B: HookBackend, S: Surface> HostCell <B, S> {

    pub const fn new () -> Self {
        HostCell { host: RefCell::new (None) }
    }

    pub fn attach (&self, host: HookHost<B, S>) {
        if let Ok(mut slot) = self.host.try_borrow_mut() {
            *slot = Some(host);
        }
    }

    pub fn detach (&self) -> Option <HookHost<B, S>> {
        self.host.try_borrow_mut() .ok() .and_then (|mut slot| slot.take())
    }

    /// runs f against the host if there is one and nobody else is using it right now
    /// (a hook can fire while the window proc or another hook callback already holds it)
    pub fn with_host <R> (&self, f: impl FnOnce (&mut HookHost<B, S>) -> R) -> Option<R> {
        let mut guard = self.host.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    }

    /// Entry point for a hook callback. When the host is busy or absent the event is only passed on, through `idle`.
    pub fn dispatch (&self, kind: HookKind, record: &EventRecord, idle: &B) -> isize {
        self.with_host (|host| host.monitor.dispatch (kind, record, &mut host.surface))
            .unwrap_or_else (|| {
                trace! ("{} event while monitor busy, forwarding only", kind);
                idle.call_next (None, record)
            })
    }
}

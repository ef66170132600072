use crate::types::HookKind;



/// Per-kind count of rendered lines .. wraps on overflow, which is fine for a status display
# [ derive (Debug, Default, Copy, Clone, Eq, PartialEq) ]
pub struct InvocationCounter (u32);

impl InvocationCounter {
    pub fn get (&self) -> u32 { self.0 }

    pub fn bump (&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}



# [ derive (Debug) ]
pub struct HookSlot <H> {
    pub kind : HookKind,
    handle   : Option<H>,
    // ^^ present exactly while the hook is installed, so there's no separate flag to drift out of sync
    pub counter : InvocationCounter,
}

impl <H: Copy> HookSlot <H> {
    fn new (kind: HookKind) -> Self {
        HookSlot { kind, handle: None, counter: InvocationCounter::default() }
    }
    pub fn is_installed (&self) -> bool { self.handle.is_some() }
}



/// Fixed table of one slot per hook kind, indexed by [`HookKind::slot`]
# [ derive (Debug) ]
pub struct HookRegistry <H> {
    slots : [HookSlot<H>; 7],
}

impl <H: Copy> HookRegistry <H> {

    pub fn new () -> Self {
        HookRegistry { slots: HookKind::ALL.map (HookSlot::new) }
    }

    pub fn slot (&self, kind: HookKind) -> &HookSlot<H> {
        &self.slots [kind.slot()]
    }
    pub fn slot_mut (&mut self, kind: HookKind) -> &mut HookSlot<H> {
        &mut self.slots [kind.slot()]
    }

    pub fn handle (&self, kind: HookKind) -> Option<H> {
        self.slot(kind).handle
    }

    /// records a freshly acquired handle .. returns false (and keeps the old one) if the slot was already occupied
    pub fn store_handle (&mut self, kind: HookKind, handle: H) -> bool {
        let slot = self.slot_mut(kind);
        if slot.handle.is_some() { return false }
        slot.handle = Some(handle);
        true
    }

    pub fn take_handle (&mut self, kind: HookKind) -> Option<H> {
        self.slot_mut(kind).handle.take()
    }

    pub fn installed_kinds (&self) -> Vec<HookKind> {
        self.slots.iter() .filter (|s| s.is_installed()) .map (|s| s.kind) .collect()
    }
}

//! Gesture-scoped listener bookkeeping and pointer capture.

use bitflags::bitflags;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

bitflags! {
    /// Pointer listeners a tool can install on the viewer surface.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Listeners: u8 {
        const POINTER_MOVE = 1 << 0;
        const POINTER_UP = 1 << 1;
        const POINTER_CANCEL = 1 << 2;
        /// Everything a drag gesture listens for between down and release.
        const GESTURE = Self::POINTER_MOVE.bits() | Self::POINTER_UP.bits() | Self::POINTER_CANCEL.bits();
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<(u64, Listeners)>,
}

/// Listeners currently installed on a surface. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, kinds: Listeners) -> ListenerGuard {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push((id, kinds));

        ListenerGuard { id, kinds, registry: Rc::downgrade(&self.inner) }
    }

    /// Union of every installed listener set.
    pub fn installed(&self) -> Listeners {
        self.inner.borrow().entries.iter().fold(Listeners::empty(), |acc, (_, kinds)| acc | *kinds)
    }

    pub fn is_installed(&self, kinds: Listeners) -> bool {
        self.installed().contains(kinds)
    }

    /// Number of live installations.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

/// Removes its listeners from the registry when dropped.
#[must_use = "dropping a ListenerGuard removes the listeners"]
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    kinds: Listeners,
    registry: Weak<RefCell<RegistryInner>>,
}

impl ListenerGuard {
    pub fn kinds(&self) -> Listeners {
        self.kinds
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Exclusive pointer capture: while held, only the capturing pointer id is
/// routed to gesture listeners.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerCapture {
    holder: Option<u32>,
}

impl PointerCapture {
    pub fn capture(&mut self, pointer_id: u32) {
        self.holder = Some(pointer_id);
    }

    pub fn release(&mut self, pointer_id: u32) {
        if self.holder == Some(pointer_id) {
            self.holder = None;
        }
    }

    pub fn holder(&self) -> Option<u32> {
        self.holder
    }

    /// Whether events from `pointer_id` may reach gesture listeners.
    pub fn admits(&self, pointer_id: u32) -> bool {
        self.holder.map_or(true, |holder| holder == pointer_id)
    }
}

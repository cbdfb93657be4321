//! Shared default length unit
//!
//! One [`DefaultUnit`] is created per viewer process and handed to every
//! widget that displays lengths. Writers go through [`DefaultUnit::set`];
//! readers subscribe with [`DefaultUnit::observe`] and keep the returned
//! [`Subscription`] alive for as long as they are mounted.

use crate::units::{LengthUnit, POINT};
use pageruler_storage::Settings;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Settings key holding the unit name.
pub const LENGTH_UNIT_SETTING: &str = "length_unit";

type Callback = Rc<dyn Fn(LengthUnit)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

impl Registry {
    fn callback(&self, id: u64) -> Option<Callback> {
        self.subscribers.iter().find(|(sid, _)| *sid == id).map(|(_, cb)| Rc::clone(cb))
    }
}

pub struct DefaultUnit {
    settings: Settings,
    current: Cell<Option<LengthUnit>>,
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for DefaultUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultUnit")
            .field("settings", &self.settings)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl DefaultUnit {
    pub fn new(settings: Settings) -> Self {
        Self { settings, current: Cell::new(None), registry: Rc::default() }
    }

    /// Current default unit.
    ///
    /// Read from settings once, then tracked in memory so a store that drops
    /// writes cannot undo a change. Falls back to points when nothing usable
    /// is stored.
    pub fn get(&self) -> LengthUnit {
        if let Some(unit) = self.current.get() {
            return unit;
        }

        let unit = self.load_persisted();
        self.current.set(Some(unit));
        unit
    }

    fn load_persisted(&self) -> LengthUnit {
        let Some(name) = self.settings.get::<Option<String>>(LENGTH_UNIT_SETTING, None) else {
            return POINT;
        };

        match LengthUnit::from_name(&name) {
            Ok(unit) => unit,
            Err(err) => {
                log::warn!("ignoring stored default unit: {err}");
                POINT
            }
        }
    }

    /// Make `unit` current, persist it and notify subscribers.
    ///
    /// Returns `false` without broadcasting when `unit` is already current.
    /// Persistence is best-effort; subscribers see the change either way.
    pub fn set(&self, unit: LengthUnit) -> bool {
        if self.get() == unit {
            return false;
        }

        self.current.set(Some(unit));
        self.settings.set(LENGTH_UNIT_SETTING, unit.name());
        self.broadcast(unit);
        true
    }

    /// Call `callback` after every change of the default unit.
    pub fn observe(&self, callback: impl Fn(LengthUnit) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.push((id, Rc::new(callback)));

        Subscription { id, registry: Rc::downgrade(&self.registry) }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }

    fn broadcast(&self, unit: LengthUnit) {
        // Handlers added during the broadcast are not called; handlers removed
        // before their turn are skipped.
        let ids: Vec<u64> = self.registry.borrow().subscribers.iter().map(|(id, _)| *id).collect();
        log::debug!("default unit changed to {unit}, notifying {} subscriber(s)", ids.len());

        for id in ids {
            let callback = self.registry.borrow().callback(id);
            if let Some(callback) = callback {
                callback(unit);
            }
        }
    }
}

/// Keeps a default-unit handler installed until dropped.
#[must_use = "dropping a Subscription removes the handler"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{CENTIMETER, INCH, MILLIMETER};
    use pageruler_storage::MemoryStore;
    use std::cell::Cell;

    fn context() -> (DefaultUnit, MemoryStore) {
        let store = MemoryStore::new();
        (DefaultUnit::new(Settings::new(store.clone())), store)
    }

    #[test]
    fn defaults_to_points() {
        let (units, _) = context();
        assert_eq!(units.get(), POINT);
    }

    #[test_log::test]
    fn unknown_stored_name_falls_back_to_points() {
        let (units, store) = context();
        store.insert_raw("pageruler#length_unit", "\"parsec\"");

        assert_eq!(units.get(), POINT);
    }

    #[test]
    fn set_persists_unit_name() {
        let (units, store) = context();
        assert!(units.set(MILLIMETER));

        assert_eq!(units.get(), MILLIMETER);
        assert_eq!(store.raw("pageruler#length_unit").as_deref(), Some("\"mm\""));
    }

    #[test]
    fn setting_current_unit_does_not_broadcast() {
        let (units, _) = context();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let _sub = units.observe(move |_| seen.set(seen.get() + 1));

        assert!(!units.set(POINT));
        assert_eq!(calls.get(), 0);

        assert!(units.set(INCH));
        assert!(!units.set(INCH));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn broadcast_reaches_subscribers_in_order() {
        let (units, _) = context();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        let _a = units.observe(move |unit| first.borrow_mut().push(("a", unit)));
        let second = Rc::clone(&log);
        let _b = units.observe(move |unit| second.borrow_mut().push(("b", unit)));

        units.set(CENTIMETER);

        assert_eq!(*log.borrow(), vec![("a", CENTIMETER), ("b", CENTIMETER)]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let (units, _) = context();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let sub = units.observe(move |_| seen.set(seen.get() + 1));
        assert_eq!(units.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(units.subscriber_count(), 0);

        units.set(INCH);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn handler_removed_mid_broadcast_is_skipped() {
        let (units, _) = context();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::default();
        let calls = Rc::new(Cell::new(0));

        let slot = Rc::clone(&victim);
        let _killer = units.observe(move |_| {
            slot.borrow_mut().take();
        });
        let seen = Rc::clone(&calls);
        *victim.borrow_mut() = Some(units.observe(move |_| seen.set(seen.get() + 1)));

        units.set(INCH);

        assert_eq!(calls.get(), 0);
        assert_eq!(units.subscriber_count(), 1);
    }

    #[test]
    fn subscription_outliving_context_is_harmless() {
        let (units, _) = context();
        let sub = units.observe(|_| {});
        drop(units);
        drop(sub);
    }

    #[test]
    fn unavailable_storage_still_broadcasts() {
        let units = DefaultUnit::new(Settings::new(MemoryStore::unavailable()));
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let _sub = units.observe(move |_| seen.set(seen.get() + 1));

        assert!(units.set(INCH));
        assert_eq!(calls.get(), 1);
        assert_eq!(units.get(), INCH);
    }

    #[test]
    fn unavailable_storage_can_switch_back_to_points() {
        let units = DefaultUnit::new(Settings::new(MemoryStore::unavailable()));
        let log = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&log);
        let _sub = units.observe(move |unit| seen.borrow_mut().push(unit));

        assert!(units.set(INCH));
        assert!(units.set(POINT));
        assert!(!units.set(POINT));

        assert_eq!(*log.borrow(), vec![INCH, POINT]);
        assert_eq!(units.get(), POINT);
    }

    #[test]
    fn subscribers_read_the_new_unit_during_broadcast() {
        let units = Rc::new(DefaultUnit::new(Settings::new(MemoryStore::unavailable())));
        let observed = Rc::new(Cell::new(None));
        let (reader, seen) = (Rc::downgrade(&units), Rc::clone(&observed));
        let _sub = units.observe(move |_| {
            if let Some(units) = reader.upgrade() {
                seen.set(Some(units.get()));
            }
        });

        units.set(CENTIMETER);
        assert_eq!(observed.get(), Some(CENTIMETER));
    }

    #[test]
    fn stored_unit_is_read_once() {
        let (units, store) = context();
        store.insert_raw("pageruler#length_unit", "\"cm\"");
        assert_eq!(units.get(), CENTIMETER);

        store.insert_raw("pageruler#length_unit", "\"mm\"");
        assert_eq!(units.get(), CENTIMETER);
    }
}

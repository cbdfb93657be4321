//! Lazily rendered length text
//!
//! A [`LengthBinding`] ties a length, a unit and a sign mode to an output
//! sink. Mutations only mark the binding dirty; text is recomputed on the next
//! [`LengthBinding::render`] and reused until an input changes again.

use crate::format::{FormatterCache, SignDisplay};
use crate::units::{Length, LengthUnit, POINT};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Destination for rendered text.
pub trait TextSink: fmt::Debug {
    fn set_text(&self, text: &str);
}

/// Shared text cell; clones observe the same contents.
#[derive(Debug, Clone, Default)]
pub struct TextSlot(Rc<RefCell<String>>);

impl TextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.0.borrow().clone()
    }
}

impl TextSink for TextSlot {
    fn set_text(&self, text: &str) {
        let mut current = self.0.borrow_mut();
        current.clear();
        current.push_str(text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Freshness {
    Dirty,
    Fresh(String),
}

#[derive(Debug)]
pub struct LengthBinding {
    target: Option<Rc<dyn TextSink>>,
    length: Length,
    unit: LengthUnit,
    sign_display: SignDisplay,
    freshness: Freshness,
}

impl Default for LengthBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthBinding {
    pub fn new() -> Self {
        Self {
            target: None,
            length: Length::default(),
            unit: POINT,
            sign_display: SignDisplay::Auto,
            freshness: Freshness::Dirty,
        }
    }

    pub fn with_sign_display(mut self, sign_display: SignDisplay) -> Self {
        self.sign_display = sign_display;
        self
    }

    pub fn target(&self) -> Option<&Rc<dyn TextSink>> {
        self.target.as_ref()
    }

    /// Replace the output sink. `None` detaches without touching the old sink.
    pub fn set_target(&mut self, target: Option<Rc<dyn TextSink>>) {
        self.target = target;
    }

    pub fn points(&self) -> f64 {
        self.length.pt()
    }

    pub fn set_points(&mut self, pt: f64) {
        if pt != self.length.pt() {
            self.length = Length::points(pt);
            self.freshness = Freshness::Dirty;
        }
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: LengthUnit) {
        if unit != self.unit {
            self.unit = unit;
            self.freshness = Freshness::Dirty;
        }
    }

    pub fn sign_display(&self) -> SignDisplay {
        self.sign_display
    }

    pub fn set_sign_display(&mut self, sign_display: SignDisplay) {
        if sign_display != self.sign_display {
            self.sign_display = sign_display;
            self.freshness = Freshness::Dirty;
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self.freshness, Freshness::Fresh(_))
    }

    /// Last rendered text, if still valid.
    pub fn text(&self) -> Option<&str> {
        match &self.freshness {
            Freshness::Fresh(text) => Some(text.as_str()),
            Freshness::Dirty => None,
        }
    }

    /// Push text to the target, recomputing it only if an input changed.
    ///
    /// Without a target nothing is computed.
    pub fn render(&mut self, formatters: &FormatterCache) {
        let Some(target) = &self.target else {
            return;
        };

        if let Freshness::Dirty = self.freshness {
            let rule = formatters.rule(self.unit, self.sign_display);
            self.freshness = Freshness::Fresh(rule.format(self.length.to_unit(self.unit)));
        }

        if let Freshness::Fresh(text) = &self.freshness {
            target.set_text(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{CENTIMETER, INCH, MILLIMETER};

    fn bound() -> (LengthBinding, TextSlot) {
        let slot = TextSlot::new();
        let mut binding = LengthBinding::new();
        binding.set_target(Some(Rc::new(slot.clone())));
        (binding, slot)
    }

    #[test]
    fn renders_in_bound_unit() {
        let cache = FormatterCache::new();
        let (mut binding, slot) = bound();

        binding.set_points(144.0);
        binding.set_unit(INCH);
        binding.render(&cache);

        assert_eq!(slot.text(), "2.0");
        assert_eq!(binding.text(), Some("2.0"));
    }

    #[test]
    fn second_render_reuses_text() {
        let cache = FormatterCache::new();
        let (mut binding, slot) = bound();
        binding.set_points(72.0);

        binding.render(&cache);
        let first = slot.text();
        assert_eq!(cache.rules_built(), 1);

        binding.render(&cache);
        assert_eq!(slot.text(), first);
        assert_eq!(cache.rules_built(), 1);
        assert!(binding.is_fresh());
    }

    #[test]
    fn unchanged_inputs_keep_binding_fresh() {
        let cache = FormatterCache::new();
        let (mut binding, _slot) = bound();
        binding.set_points(10.0);
        binding.render(&cache);

        binding.set_points(10.0);
        binding.set_unit(POINT);
        binding.set_sign_display(SignDisplay::Auto);
        assert!(binding.is_fresh());
    }

    #[test]
    fn every_input_invalidates() {
        let cache = FormatterCache::new();
        let (mut binding, slot) = bound();
        binding.set_points(28.346456692913385);
        binding.render(&cache);
        assert_eq!(slot.text(), "28");

        binding.set_unit(CENTIMETER);
        assert!(!binding.is_fresh());
        binding.render(&cache);
        assert_eq!(slot.text(), "1.0");

        binding.set_sign_display(SignDisplay::ExceptZero);
        assert_eq!(binding.text(), None);
        binding.render(&cache);
        assert_eq!(slot.text(), "+1.0");

        binding.set_points(-56.69291338582677);
        binding.render(&cache);
        assert_eq!(slot.text(), "-2.0");
    }

    #[test]
    fn render_without_target_computes_nothing() {
        let cache = FormatterCache::new();
        let mut binding = LengthBinding::new();
        binding.set_points(5.0);
        binding.render(&cache);

        assert_eq!(cache.rules_built(), 0);
        assert!(!binding.is_fresh());
    }

    #[test]
    fn detaching_target_stops_updates() {
        let cache = FormatterCache::new();
        let (mut binding, slot) = bound();
        binding.set_points(25.4 * 72.0 / 25.4);
        binding.set_unit(MILLIMETER);
        binding.render(&cache);
        assert_eq!(slot.text(), "25");

        binding.set_target(None);
        binding.set_points(0.0);
        binding.render(&cache);

        assert_eq!(slot.text(), "25");
        assert!(binding.target().is_none());
    }

    #[test]
    fn nan_renders_without_panicking() {
        let cache = FormatterCache::new();
        let (mut binding, slot) = bound();
        binding.set_points(f64::NAN);
        binding.render(&cache);

        assert_eq!(slot.text(), "NaN");
    }
}

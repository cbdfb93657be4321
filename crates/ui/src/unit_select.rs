//! Unit selection control.

use crate::context::ViewerContext;
use pageruler_core::{DefaultUnit, LengthUnit, UnitError, ALL_UNITS};
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Writes the default unit; the only writer in a viewer process.
#[derive(Debug, Clone)]
pub struct UnitSelector {
    default_unit: Rc<DefaultUnit>,
}

impl UnitSelector {
    pub fn new(ctx: &ViewerContext) -> Self {
        Self { default_unit: Rc::clone(&ctx.default_unit) }
    }

    /// Every catalog unit, with the current default marked.
    pub fn options(&self) -> Vec<UnitOption> {
        let current = self.default_unit.get();

        ALL_UNITS
            .iter()
            .map(|unit| UnitOption { name: unit.name(), selected: *unit == current })
            .collect()
    }

    pub fn selected_index(&self) -> Option<usize> {
        let current = self.default_unit.get();
        ALL_UNITS.iter().position(|unit| *unit == current)
    }

    /// Make `name` the default unit. Returns whether it changed.
    pub fn select(&self, name: &str) -> Result<bool, UnitError> {
        let unit = LengthUnit::from_name(name)?;
        Ok(self.default_unit.set(unit))
    }
}

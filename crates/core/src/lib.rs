//! PageRuler Core Library
//!
//! Physical length units, number formatting and the shared default-unit
//! preference used by the measurement overlay.

pub mod binding;
pub mod default_unit;
pub mod format;
pub mod units;

pub use binding::{LengthBinding, TextSink, TextSlot};
pub use default_unit::{DefaultUnit, Subscription, LENGTH_UNIT_SETTING};
pub use format::{FormatRule, FormatterCache, NumberLocale, SignDisplay};
pub use units::{
    Length, LengthUnit, UnitError, ALL_UNITS, CENTIMETER, INCH, MILLIMETER, POINT,
};

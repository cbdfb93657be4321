//! Physical length units
//!
//! Lengths are stored in points (1/72 inch), the unit of PDF page space.
//! Conversion is exact floating-point division; rounding is left to display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const POINTS_PER_INCH: f64 = 72.0;

/// Base unit
pub const POINT: LengthUnit = LengthUnit { name: "pt", points_per_unit: 1.0 };

pub const INCH: LengthUnit = LengthUnit { name: "in", points_per_unit: POINTS_PER_INCH };

pub const CENTIMETER: LengthUnit =
    LengthUnit { name: "cm", points_per_unit: POINTS_PER_INCH / 2.54 };

pub const MILLIMETER: LengthUnit =
    LengthUnit { name: "mm", points_per_unit: POINTS_PER_INCH / 25.4 };

/// Every supported unit, in display order.
pub const ALL_UNITS: [LengthUnit; 4] = [POINT, INCH, CENTIMETER, MILLIMETER];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("unknown length unit {0:?} (supported: {names})", names = supported_names())]
    UnknownUnit(String),
}

fn supported_names() -> String {
    ALL_UNITS.iter().map(|unit| unit.name).collect::<Vec<_>>().join(", ")
}

/// A unit from the fixed catalog. Units compare and hash by name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub struct LengthUnit {
    name: &'static str,
    points_per_unit: f64,
}

impl LengthUnit {
    /// Look up a catalog unit by its short name (`pt`, `in`, `cm`, `mm`).
    pub fn from_name(name: &str) -> Result<Self, UnitError> {
        ALL_UNITS
            .iter()
            .find(|unit| unit.name == name)
            .copied()
            .ok_or_else(|| UnitError::UnknownUnit(name.to_owned()))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn points_per_unit(&self) -> f64 {
        self.points_per_unit
    }
}

impl Default for LengthUnit {
    fn default() -> Self {
        POINT
    }
}

impl PartialEq for LengthUnit {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for LengthUnit {}

impl Hash for LengthUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for LengthUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for LengthUnit {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<LengthUnit> for &'static str {
    fn from(unit: LengthUnit) -> Self {
        unit.name
    }
}

/// An immutable physical length, held in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Length {
    pt: f64,
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { pt: value * unit.points_per_unit }
    }

    pub fn points(pt: f64) -> Self {
        Self { pt }
    }

    pub fn pt(self) -> f64 {
        self.pt
    }

    /// Value expressed in `unit`. No rounding is applied.
    pub fn to_unit(self, unit: LengthUnit) -> f64 {
        self.pt / unit.points_per_unit
    }

    /// The given percentage of this length.
    pub fn percent(self, pct: f64) -> Self {
        Self { pt: pct * self.pt / 100.0 }
    }
}

impl From<f64> for Length {
    fn from(pt: f64) -> Self {
        Self::points(pt)
    }
}

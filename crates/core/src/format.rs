//! Number formatting for lengths
//!
//! A [`FormatRule`] is a pure function of `(unit, sign display)` plus the
//! locale. [`FormatterCache`] memoizes rules so repeated renders never rebuild
//! them; the catalog is closed, so the cache is bounded and never evicts.

use crate::units::{LengthUnit, CENTIMETER, INCH};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Whether a leading sign is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignDisplay {
    /// Sign for negative values only (including negative zero).
    #[default]
    Auto,
    /// `+` or `-` for everything except values that round to zero.
    ExceptZero,
}

/// Separators used when printing numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub group_separator: Option<char>,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self { decimal_separator: '.', group_separator: Some(',') }
    }
}

/// Immutable formatting rule for one unit and sign mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRule {
    fraction_digits: usize,
    sign_display: SignDisplay,
    locale: NumberLocale,
}

impl FormatRule {
    pub fn for_unit(unit: LengthUnit, sign_display: SignDisplay, locale: NumberLocale) -> Self {
        // Coarse units get one decimal so that small distances stay readable.
        let fraction_digits = if unit == INCH || unit == CENTIMETER { 1 } else { 0 };

        Self { fraction_digits, sign_display, locale }
    }

    pub fn fraction_digits(&self) -> usize {
        self.fraction_digits
    }

    pub fn sign_display(&self) -> SignDisplay {
        self.sign_display
    }

    /// Render `value`, rounding half away from zero.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_owned();
        }

        let negative = value.is_sign_negative();
        let magnitude = value.abs();

        let (body, rounds_to_zero) = if magnitude.is_infinite() {
            ("∞".to_owned(), false)
        } else {
            // `{:.N}` rounds the exact binary value, resolving exact ties to even.
            let digits = if is_exact_tie(magnitude, self.fraction_digits) {
                let scale = 10f64.powi(self.fraction_digits as i32);
                let scaled = (magnitude * scale).round();
                format!("{:.*}", self.fraction_digits, scaled / scale)
            } else {
                format!("{:.*}", self.fraction_digits, magnitude)
            };
            let zero = digits.bytes().all(|b| b == b'0' || b == b'.');
            (self.localize(&digits), zero)
        };

        let sign = match self.sign_display {
            SignDisplay::Auto if negative => "-",
            SignDisplay::Auto => "",
            SignDisplay::ExceptZero if rounds_to_zero => "",
            SignDisplay::ExceptZero if negative => "-",
            SignDisplay::ExceptZero => "+",
        };

        format!("{sign}{body}")
    }

    fn localize(&self, digits: &str) -> String {
        let (integer, fraction) = match digits.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (digits, None),
        };

        let mut out = String::with_capacity(digits.len() + integer.len() / 3);

        for (idx, ch) in integer.chars().enumerate() {
            let remaining = integer.len() - idx;
            if idx > 0 && remaining % 3 == 0 {
                if let Some(separator) = self.locale.group_separator {
                    out.push(separator);
                }
            }
            out.push(ch);
        }

        if let Some(fraction) = fraction {
            out.push(self.locale.decimal_separator);
            out.push_str(fraction);
        }

        out
    }
}

/// Whether `magnitude` lies exactly halfway between two values with
/// `fraction_digits` decimals, i.e. `magnitude * 2 * 10^digits` is an odd integer.
fn is_exact_tie(magnitude: f64, fraction_digits: usize) -> bool {
    let bits = magnitude.to_bits();
    let exponent_bits = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exponent_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exponent_bits - 1075)
    };
    if mantissa == 0 {
        return false;
    }

    let Some(odd_part) = u32::try_from(fraction_digits)
        .ok()
        .and_then(|digits| 5u128.checked_pow(digits))
        .and_then(|power| power.checked_mul(u128::from(mantissa)))
    else {
        return false;
    };
    let shift = -(exponent + 1 + fraction_digits as i64);
    shift >= 0 && i64::from(odd_part.trailing_zeros()) == shift
}

/// Memoizes [`FormatRule`]s keyed by unit name and sign display.
#[derive(Debug, Default)]
pub struct FormatterCache {
    locale: NumberLocale,
    rules: RefCell<HashMap<(&'static str, SignDisplay), Rc<FormatRule>>>,
    rules_built: Cell<usize>,
}

impl FormatterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(locale: NumberLocale) -> Self {
        Self { locale, ..Self::default() }
    }

    pub fn locale(&self) -> NumberLocale {
        self.locale
    }

    pub fn rule(&self, unit: LengthUnit, sign_display: SignDisplay) -> Rc<FormatRule> {
        let key = (unit.name(), sign_display);

        if let Some(rule) = self.rules.borrow().get(&key) {
            return Rc::clone(rule);
        }

        let rule = Rc::new(FormatRule::for_unit(unit, sign_display, self.locale));
        self.rules_built.set(self.rules_built.get() + 1);
        self.rules.borrow_mut().insert(key, Rc::clone(&rule));
        rule
    }

    /// Number of rules constructed so far.
    pub fn rules_built(&self) -> usize {
        self.rules_built.get()
    }

    pub fn len(&self) -> usize {
        self.rules.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.borrow().is_empty()
    }
}

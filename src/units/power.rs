//! Symbol-preserving exponentiation of units

use super::Unit;
use crate::errors::{ClimDiagError, Result};
use crate::reporting::Reporter;

/// `2^63`, the first whole `f64` above the `i64` range
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// A number units can be raised to
///
/// Implemented for the primitive integers and floats, so callers can pass
/// `2`, `-3_i64` or `2.0` alike.
pub trait Power: Copy {
    /// The value as a float, used for validation and error messages
    fn as_f64(self) -> f64;

    /// The value as `i64`, `None` if it is not a whole number in range
    fn to_i64(self) -> Option<i64>;
}

macro_rules! impl_power_for_int {
    ($($t:ty),*) => {
        $(
            impl Power for $t {
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn as_f64(self) -> f64 {
                    self as f64
                }

                fn to_i64(self) -> Option<i64> {
                    i64::try_from(self).ok()
                }
            }
        )*
    };
}

impl_power_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Power for f64 {
    fn as_f64(self) -> f64 {
        self
    }

    fn to_i64(self) -> Option<i64> {
        if self.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&self) {
            #[allow(clippy::cast_possible_truncation)]
            let value = self as i64;
            Some(value)
        } else {
            None
        }
    }
}

impl Power for f32 {
    fn as_f64(self) -> f64 {
        f64::from(self)
    }

    fn to_i64(self) -> Option<i64> {
        f64::from(self).to_i64()
    }
}

/// Raise `units` to an integer power without expanding its symbols
///
/// `units_power(&Unit::parse("J")?, 2, ..)` gives `J2`, keeping the symbols
/// the unit was written with. Every written factor is kept in order, with its
/// exponent multiplied by `power` (so power `0` turns `kg m` into `kg0 m0`).
/// `.`-separated input is rewritten with whitespace separators.
///
/// Unknown and no-unit markers are returned unchanged. Units without a
/// recorded origin, or whose origin starts with a numeric scale, cannot be
/// rewritten symbolically: a warning is reported and [`Unit::powi`] is used.
///
/// # Errors
///
/// Returns [`ClimDiagError::NonIntegerPower`] if `power` is not a whole
/// number, and [`ClimDiagError::ExponentOverflow`] if the power or a
/// resulting exponent does not fit in an `i64`.
pub fn units_power<P: Power>(units: &Unit, power: P, reporter: &dyn Reporter) -> Result<Unit> {
    let value = power.as_f64();
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ClimDiagError::NonIntegerPower { power: value });
    }

    if units.is_unknown() || units.is_no_unit() {
        return Ok(units.clone());
    }

    let power = power
        .to_i64()
        .ok_or_else(|| ClimDiagError::ExponentOverflow {
            symbol: units.to_string(),
            power: value,
        })?;

    if units.origin().is_none() {
        reporter.warn(&format!(
            "Symbol-preserving exponentiation of units '{units}' is not supported, origin is \
             not given"
        ));
        return units.powi(power);
    }

    if units.scale().is_some() {
        reporter.warn(&format!(
            "Symbol-preserving exponentiation of units '{units}' is not supported because of \
             leading numbers"
        ));
        return units.powi(power);
    }

    if units.factors().is_empty() {
        return Ok(units.clone());
    }

    let mut parts = Vec::with_capacity(units.factors().len());
    for factor in units.factors() {
        parts.push(format!("{}{}", factor.symbol, factor.raised_exponent(power)?));
    }

    Unit::parse(&parts.join(" "))
}

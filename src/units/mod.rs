//! Physical unit algebra
//!
//! A [`Unit`] is either one of the two non-algebraic markers (unknown units,
//! no unit) or a product of named symbols raised to integer exponents with an
//! optional leading numeric scale, e.g. `kg2 m-1` or `2.0 m s-1`.
//!
//! Units parsed from text remember that text as their origin. Units produced
//! by native algebra ([`Unit::powi`], [`Unit::multiply`]) carry no origin and
//! render their canonical definition instead.
//!
//! # Organization
//!
//! - [`parse`]: unit expression parser
//! - [`power`]: symbol-preserving exponentiation ([`units_power`])

pub mod parse;
pub mod power;

pub use power::{units_power, Power};

use crate::errors::{ClimDiagError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A symbol raised to an integer exponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    pub symbol: String,
    pub exponent: i64,
}

impl Factor {
    #[must_use]
    pub fn new(symbol: impl Into<String>, exponent: i64) -> Self {
        Self {
            symbol: symbol.into(),
            exponent,
        }
    }

    /// Exponent multiplied by `power`
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::ExponentOverflow`] if the product leaves the
    /// `i64` range.
    #[allow(clippy::cast_precision_loss)]
    pub fn raised_exponent(&self, power: i64) -> Result<i64> {
        self.exponent
            .checked_mul(power)
            .ok_or_else(|| ClimDiagError::ExponentOverflow {
                symbol: self.symbol.clone(),
                power: power as f64,
            })
    }
}

/// Structural content of a unit
#[derive(Debug, Clone)]
pub enum UnitKind {
    /// Units are not known
    Unknown,
    /// The quantity has no unit at all (e.g. a category)
    NoUnit,
    /// Product of symbols with integer exponents and an optional scale
    Algebraic {
        scale: Option<f64>,
        factors: Vec<Factor>,
    },
}

/// Algebraic physical unit with its originating text
#[derive(Debug, Clone)]
pub struct Unit {
    kind: UnitKind,
    origin: Option<String>,
}

impl Unit {
    /// Parse a unit expression, keeping `text` as origin
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::InvalidUnit`] for malformed expressions.
    pub fn parse(text: &str) -> Result<Self> {
        let kind = parse::parse_kind(text)?;
        Ok(Self {
            kind,
            origin: Some(text.to_string()),
        })
    }

    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            kind: UnitKind::Unknown,
            origin: None,
        }
    }

    #[must_use]
    pub const fn no_unit() -> Self {
        Self {
            kind: UnitKind::NoUnit,
            origin: None,
        }
    }

    /// Dimensionless unit `1`
    #[must_use]
    pub const fn dimensionless() -> Self {
        Self {
            kind: UnitKind::Algebraic {
                scale: None,
                factors: Vec::new(),
            },
            origin: None,
        }
    }

    /// Build a unit from factors without recording an origin
    #[must_use]
    pub fn from_factors(scale: Option<f64>, factors: Vec<Factor>) -> Self {
        Self {
            kind: UnitKind::Algebraic { scale, factors },
            origin: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &UnitKind {
        &self.kind
    }

    /// Text the unit was parsed from, if any
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self.kind, UnitKind::Unknown)
    }

    #[must_use]
    pub const fn is_no_unit(&self) -> bool {
        matches!(self.kind, UnitKind::NoUnit)
    }

    /// Leading numeric scale, if one was written
    #[must_use]
    pub const fn scale(&self) -> Option<f64> {
        match &self.kind {
            UnitKind::Algebraic { scale, .. } => *scale,
            _ => None,
        }
    }

    /// Factors in the order they were written; empty for markers
    #[must_use]
    pub fn factors(&self) -> &[Factor] {
        match &self.kind {
            UnitKind::Algebraic { factors, .. } => factors,
            _ => &[],
        }
    }

    /// Net exponent per symbol, zero exponents removed
    #[must_use]
    pub fn exponents(&self) -> BTreeMap<&str, i64> {
        let mut map: BTreeMap<&str, i64> = BTreeMap::new();
        for factor in self.factors() {
            *map.entry(factor.symbol.as_str()).or_insert(0) += factor.exponent;
        }
        map.retain(|_, exp| *exp != 0);
        map
    }

    /// Raise the unit to an integer power by direct exponent algebra
    ///
    /// Repeated symbols are merged, zero exponents dropped, and the result
    /// carries no origin.
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::ExponentOverflow`] if an exponent overflows.
    pub fn powi(&self, power: i64) -> Result<Self> {
        let (scale, factors) = match &self.kind {
            UnitKind::Unknown => return Ok(Self::unknown()),
            UnitKind::NoUnit => return Ok(Self::no_unit()),
            UnitKind::Algebraic { scale, factors } => (scale, factors),
        };

        let mut raised = Vec::with_capacity(factors.len());
        for factor in merge_factors(factors) {
            let exponent = factor.raised_exponent(power)?;
            if exponent != 0 {
                raised.push(Factor::new(factor.symbol, exponent));
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let scale = scale.map(|s| s.powf(power as f64));
        Ok(Self::from_factors(scale, raised))
    }

    /// Product of two units
    ///
    /// # Errors
    ///
    /// Multiplying by a no-unit marker is not defined and fails with
    /// [`ClimDiagError::IncompatibleUnits`].
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        match (&self.kind, &other.kind) {
            (UnitKind::NoUnit, _) | (_, UnitKind::NoUnit) => {
                Err(ClimDiagError::IncompatibleUnits {
                    left: self.to_string(),
                    right: other.to_string(),
                })
            }
            (UnitKind::Unknown, _) | (_, UnitKind::Unknown) => Ok(Self::unknown()),
            (
                UnitKind::Algebraic {
                    scale: left_scale,
                    factors: left,
                },
                UnitKind::Algebraic {
                    scale: right_scale,
                    factors: right,
                },
            ) => {
                let scale = match (left_scale, right_scale) {
                    (None, None) => None,
                    (l, r) => Some(l.unwrap_or(1.0) * r.unwrap_or(1.0)),
                };
                let combined: Vec<Factor> = left.iter().chain(right.iter()).cloned().collect();
                let factors = merge_factors(&combined)
                    .into_iter()
                    .filter(|f| f.exponent != 0)
                    .collect();
                Ok(Self::from_factors(scale, factors))
            }
        }
    }

    /// Canonical rendering: merged symbols, exponent 1 omitted
    #[must_use]
    pub fn definition(&self) -> String {
        match &self.kind {
            UnitKind::Unknown => "unknown".to_string(),
            UnitKind::NoUnit => "no_unit".to_string(),
            UnitKind::Algebraic { scale, factors } => {
                let mut parts: Vec<String> = Vec::new();
                if let Some(scale) = scale {
                    let unity = (*scale - 1.0).abs() <= f64::EPSILON;
                    if !unity || factors.iter().all(|f| f.exponent == 0) {
                        parts.push(scale.to_string());
                    }
                }
                for factor in merge_factors(factors) {
                    match factor.exponent {
                        0 => {}
                        1 => parts.push(factor.symbol),
                        exp => parts.push(format!("{}{exp}", factor.symbol)),
                    }
                }
                if parts.is_empty() {
                    "1".to_string()
                } else {
                    parts.join(" ")
                }
            }
        }
    }
}

/// Sum exponents of repeated symbols, keeping first-seen order
fn merge_factors(factors: &[Factor]) -> Vec<Factor> {
    let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
    for factor in factors {
        match merged.iter_mut().find(|f| f.symbol == factor.symbol) {
            Some(existing) => existing.exponent += factor.exponent,
            None => merged.push(factor.clone()),
        }
    }
    merged
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (UnitKind::Unknown, UnitKind::Unknown) | (UnitKind::NoUnit, UnitKind::NoUnit) => true,
            (UnitKind::Algebraic { scale: a, .. }, UnitKind::Algebraic { scale: b, .. }) => {
                let (a, b) = (a.unwrap_or(1.0), b.unwrap_or(1.0));
                let scales_match = (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0);
                scales_match && self.exponents() == other.exponents()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{origin}"),
            None => write!(f, "{}", self.definition()),
        }
    }
}

impl FromStr for Unit {
    type Err = ClimDiagError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

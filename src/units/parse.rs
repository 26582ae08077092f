//! Unit expression parser
//!
//! Accepted grammar:
//!
//! ```text
//! expression := marker | [scale] factor { separator factor }
//! separator  := whitespace | "." | "*" | "/"   ("/" negates the next factor)
//! factor     := symbol [ "^" | "**" ] [ sign ] digits
//! ```
//!
//! Markers: `""`, `unknown`, `?`, `???` (unknown units) and `no_unit`,
//! `no unit`, `nounit` (no unit).

use super::{Factor, UnitKind};
use crate::errors::{ClimDiagError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FACTOR_RE: Regex = Regex::new(r"^(?P<symbol>[^\d\^+\-]+)\^?(?P<exponent>[+-]?\d+)?$")
        .expect("factor pattern is valid");
}

const UNKNOWN_MARKERS: [&str; 4] = ["", "unknown", "?", "???"];
const NO_UNIT_MARKERS: [&str; 3] = ["no_unit", "no unit", "nounit"];

pub(crate) fn parse_kind(text: &str) -> Result<UnitKind> {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();
    if UNKNOWN_MARKERS.contains(&lowered.as_str()) {
        return Ok(UnitKind::Unknown);
    }
    if NO_UNIT_MARKERS.contains(&lowered.as_str()) {
        return Ok(UnitKind::NoUnit);
    }

    let normalised = trimmed.replace("**", "^");
    let mut tokens = normalised.split_whitespace().peekable();

    let scale = match tokens.peek().and_then(|t| parse_number(t)) {
        Some(value) => {
            tokens.next();
            Some(value)
        }
        None => None,
    };

    let mut factors = Vec::new();
    for token in tokens {
        parse_token(text, token, &mut factors)?;
    }

    if factors.is_empty() && scale.is_none() {
        return Err(invalid(text, "no unit factors found"));
    }
    Ok(UnitKind::Algebraic { scale, factors })
}

/// Split one whitespace-delimited token on `.`, `*` and `/`
fn parse_token(text: &str, token: &str, factors: &mut Vec<Factor>) -> Result<()> {
    let mut segment = String::new();
    let mut negate = false;

    for ch in token.chars() {
        match ch {
            '.' | '*' | '/' => {
                factors.push(parse_factor(text, &segment, negate)?);
                segment.clear();
                negate = ch == '/';
            }
            _ => segment.push(ch),
        }
    }
    factors.push(parse_factor(text, &segment, negate)?);
    Ok(())
}

fn parse_factor(text: &str, segment: &str, negate: bool) -> Result<Factor> {
    if segment.is_empty() {
        return Err(invalid(text, "empty factor between separators"));
    }
    if parse_number(segment).is_some() {
        return Err(invalid(
            text,
            &format!("numeric factor '{segment}' is only allowed as leading scale"),
        ));
    }

    let captures = FACTOR_RE
        .captures(segment)
        .ok_or_else(|| invalid(text, &format!("cannot parse factor '{segment}'")))?;
    let symbol = &captures["symbol"];
    let exponent = match captures.name("exponent") {
        Some(m) => m
            .as_str()
            .parse::<i64>()
            .map_err(|e| invalid(text, &format!("bad exponent in '{segment}': {e}")))?,
        None => 1,
    };

    Ok(Factor::new(symbol, if negate { -exponent } else { exponent }))
}

/// Numeric literal starting with a digit, sign or decimal point
fn parse_number(text: &str) -> Option<f64> {
    let numeric_start = text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'));
    if numeric_start {
        text.parse().ok()
    } else {
        None
    }
}

fn invalid(text: &str, message: &str) -> ClimDiagError {
    ClimDiagError::InvalidUnit {
        spec: text.to_string(),
        message: message.to_string(),
    }
}

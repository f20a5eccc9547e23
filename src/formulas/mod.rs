//! Scaling & leveling formulas.
//!
//! Everything here is a total function. Rounding to [`PRECISION`] decimal
//! places happens only through [`round_to_precision`], which every stage of
//! the pipeline (multiplier, scaled experience, stored experience) shares.
//!
//! ```text
//! duration → minutes / MINUTES_PER_UNIT → multiplier
//! propagated × multiplier → scaled delta
//! level = floor(log2(exp + 1))      threshold(L) = 2^L − 1
//! ```

use std::collections::BTreeMap;

use crate::model::{DurationInput, Label};

/// Decimal places kept at every rounding stage.
pub const PRECISION: i32 = 4;

/// Minutes of effort worth a multiplier of 1.0.
pub const MINUTES_PER_UNIT: f64 = 30.0;

/// Multiplier used when the duration is missing or unusable.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

// ============================================================================
// Rounding
// ============================================================================

/// Round to [`PRECISION`] decimal places, half away from zero.
///
/// Magnitudes too large to scale without overflow are returned as-is; they
/// carry no fractional digits anyway.
pub fn round_to_precision(value: f64) -> f64 {
    let factor = 10f64.powi(PRECISION);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

// ============================================================================
// Duration → multiplier
// ============================================================================

/// Resolve a duration to minutes. `None` when the input cannot be read.
pub fn duration_minutes(input: &DurationInput) -> Option<f64> {
    match input {
        DurationInput::Minutes(m) => Some(*m),
        DurationInput::Text(text) => parse_duration_text(text),
    }
}

/// Multiplier for a duration at the default 30-minute unit.
///
/// ```
/// use progression_graph::formulas::parse_duration_to_multiplier;
/// use progression_graph::DurationInput;
///
/// assert_eq!(parse_duration_to_multiplier(Some(&DurationInput::Minutes(60.0))), 2.0);
/// assert_eq!(parse_duration_to_multiplier(Some(&"1h30m".into())), 3.0);
/// assert_eq!(parse_duration_to_multiplier(None), 1.0);
/// ```
pub fn parse_duration_to_multiplier(duration: Option<&DurationInput>) -> f64 {
    duration_multiplier(duration, MINUTES_PER_UNIT)
}

/// Multiplier for a duration at an arbitrary unit length.
///
/// Missing, unparseable, non-finite or non-positive durations fall back to
/// [`DEFAULT_MULTIPLIER`].
pub fn duration_multiplier(duration: Option<&DurationInput>, minutes_per_unit: f64) -> f64 {
    let Some(input) = duration else {
        return DEFAULT_MULTIPLIER;
    };
    match duration_minutes(input) {
        Some(minutes) if minutes.is_finite() && minutes > 0.0 => {
            round_to_precision(minutes / minutes_per_unit)
        }
        _ => {
            tracing::warn!(?input, "unusable duration, using default multiplier");
            DEFAULT_MULTIPLIER
        }
    }
}

/// Parse legacy free-text durations: `"90"`, `"45m"`, `"2h"`, `"1h30m"`,
/// `"1h 30min"`, `"1.5 hours"`.
fn parse_duration_text(text: &str) -> Option<f64> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if let Ok(minutes) = text.parse::<f64>() {
        return Some(minutes);
    }

    let mut chars = text.chars().peekable();
    let mut total = 0.0;
    let mut parsed_any = false;

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut number = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            number.push(c);
        }
        let value: f64 = number.parse().ok()?;

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut unit = String::new();
        while let Some(c) = chars.next_if(|c| c.is_alphabetic()) {
            unit.push(c);
        }

        total += match unit.as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => value * 60.0,
            "m" | "min" | "mins" | "minute" | "minutes" | "" => value,
            _ => return None,
        };
        parsed_any = true;
    }

    parsed_any.then_some(total)
}

// ============================================================================
// Scaling
// ============================================================================

/// Multiply every propagated value by `multiplier`, rounding each result.
pub fn scale_experience(propagated: &BTreeMap<Label, f64>, multiplier: f64) -> BTreeMap<Label, f64> {
    propagated
        .iter()
        .map(|(label, value)| (label.clone(), round_to_precision(value * multiplier)))
        .collect()
}

// ============================================================================
// Leveling curve
// ============================================================================

/// `floor(log2(total + 1))`. Each level costs as much new experience as all
/// prior levels combined. Negative or NaN input is level 0.
pub fn level_for_exp(total_exp: f64) -> u32 {
    if total_exp.is_nan() || total_exp <= 0.0 {
        return 0;
    }
    let mut level = (total_exp + 1.0).log2().floor() as u32;
    // log2 can round up just below a power of two
    while level > 0 && exp_for_level(level) > total_exp {
        level -= 1;
    }
    while level < u32::MAX && exp_for_level(level + 1) <= total_exp {
        level += 1;
    }
    level
}

/// Cumulative experience needed to reach `level`: `2^level − 1`.
pub fn exp_for_level(level: u32) -> f64 {
    2f64.powi(level.min(i32::MAX as u32) as i32) - 1.0
}

/// Fraction of the way from the current level's threshold to the next.
/// Returns 0 on a zero-width bracket.
pub fn exp_progress(total_exp: f64) -> f64 {
    let level = level_for_exp(total_exp);
    let current = exp_for_level(level);
    let next = exp_for_level(level.saturating_add(1));
    let width = next - current;
    if !width.is_finite() || width <= 0.0 {
        return 0.0;
    }
    let progress = (total_exp - current) / width;
    if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) }
}

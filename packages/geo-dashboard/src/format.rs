//! Display formatting for metric values.
//!
//! Output follows en-US conventions: dollars with up to two fraction digits,
//! thousands separators, and percentages with one decimal.

use std::ops::Range;
use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// Formats metric values for labels and popups.
pub trait ValueFormatter: Send + Sync {
    /// Dollar amount, e.g. `$1,234.5`.
    fn currency(&self, value: f64) -> String;

    /// Plain count with thousands separators, e.g. `12,345`.
    fn number(&self, value: f64) -> String;

    /// Percentage from a 0–100 value, e.g. `3.5%`.
    fn percent(&self, value: f64) -> String;
}

/// The default en-US formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsdFormatter;

impl ValueFormatter for UsdFormatter {
    fn currency(&self, value: f64) -> String {
        currency(value)
    }

    fn number(&self, value: f64) -> String {
        number(value)
    }

    fn percent(&self, value: f64) -> String {
        percent(value)
    }
}

/// Magnitudes numfmt renders in plain notation. Anything outside falls back
/// to [`group_fixed`].
const PLAIN_RANGE: Range<f64> = 1.0..1e15;

pub fn currency(value: f64) -> String {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::currency("$")
            .expect("valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    let rounded = round_to(value, 2);
    if rounded == 0.0 {
        return "$0".to_owned();
    }

    let magnitude = rounded.abs();
    let formatted = if PLAIN_RANGE.contains(&magnitude) {
        trim_fraction(formatter.fmt_string(magnitude))
    } else {
        format!("${}", group_fixed(magnitude, 2))
    };

    if rounded < 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

pub fn number(value: f64) -> String {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .expect("valid separator")
            .precision(Precision::Decimals(3))
    });

    let rounded = round_to(value, 3);
    if rounded == 0.0 {
        return "0".to_owned();
    }

    let magnitude = rounded.abs();
    let formatted = if PLAIN_RANGE.contains(&magnitude) {
        trim_fraction(formatter.fmt_string(magnitude))
    } else {
        group_fixed(magnitude, 3)
    };

    if rounded < 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

pub fn percent(value: f64) -> String {
    let rounded = round_to(value, 1);
    if rounded == 0.0 {
        return "0.0%".to_owned();
    }

    let mut formatted = if PLAIN_RANGE.contains(&rounded.abs()) {
        static FORMATTER: OnceLock<Formatter> = OnceLock::new();

        let formatter = FORMATTER.get_or_init(|| {
            Formatter::new()
                .separator(',')
                .expect("valid separator")
                .precision(Precision::Decimals(1))
        });

        let plain = trim_fraction(formatter.fmt_string(rounded.abs()));
        if rounded < 0.0 {
            format!("-{plain}")
        } else {
            plain
        }
    } else if rounded < 0.0 {
        format!("-{}", group_fixed(rounded.abs(), 1))
    } else {
        group_fixed(rounded, 1)
    };

    if !formatted.contains('.') {
        formatted.push_str(".0");
    }
    formatted.push('%');
    formatted
}

/// Round half away from zero at `decimals` fraction digits.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Fixed-point rendering of a non-negative value with thousands separators
/// and trailing fractional zeros dropped.
fn group_fixed(magnitude: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, magnitude);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + fraction.len() + 1);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    trim_fraction(grouped)
}

/// Shorten `s` to `max_length` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_length: usize) -> String {
    if s.chars().count() > max_length {
        let mut truncated: String = s.chars().take(max_length).collect();
        truncated.push_str("...");
        truncated
    } else {
        s.to_owned()
    }
}

/// Drop trailing fractional zeros (and a dangling point) left by numfmt.
fn trim_fraction(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }

    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}

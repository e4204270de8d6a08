//! Locale-aware number parsing and Danish display formatting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display text for a revenue figure omitted under the small-company exemption.
pub const UNKNOWN_TEXT: &str = "Ukendt";

/// Display text for a value that was not reported at all.
pub const MISSING_TEXT: &str = "-";

/// Parses a Danish/European formatted number.
///
/// - both `,` and `.` present: `.` groups thousands, `,` is the decimal mark
/// - only `,` present: `,` is the decimal mark
/// - only `.` present: plain decimal, unless it is laid out as thousand groups
///   ("1.000.000", "900.000")
///
/// Returns `None` for anything that does not read as a finite number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return None;
    }

    let normalized = match (s.contains(','), s.contains('.')) {
        (true, true) => s.replace('.', "").replace(',', "."),
        (true, false) => s.replace(',', "."),
        (false, true) if is_dot_grouped(&s) => s.replace('.', ""),
        _ => s,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_dot_grouped(s: &str) -> bool {
    let unsigned = s.trim_start_matches(['-', '+']);
    let mut parts = unsigned.split('.');

    let Some(head) = parts.next() else {
        return false;
    };
    if head.is_empty()
        || head.len() > 3
        || head.starts_with('0')
        || !head.chars().all(|c| c.is_ascii_digit())
    {
        return false;
    }

    let mut groups = 0;
    for group in parts {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        groups += 1;
    }
    groups > 0
}

/// A value at the display boundary: a number, an explicit "unknown", or nothing reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Amount {
    Value(f64),
    Unknown,
    Missing,
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl From<Option<f64>> for Amount {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(*self))
    }
}

/// Danish amount: thousands grouped with `.`, no decimals ("1.234.568").
pub fn format_amount(value: impl Into<Amount>) -> String {
    match value.into() {
        Amount::Value(v) => {
            let rounded = format!("{:.0}", v);
            let (sign, digits) = split_sign(&rounded);
            if digits.chars().all(|c| c == '0') {
                return digits.to_string();
            }
            format!("{}{}", sign, group_thousands(digits))
        }
        Amount::Unknown => UNKNOWN_TEXT.to_string(),
        Amount::Missing => MISSING_TEXT.to_string(),
    }
}

/// Danish percentage of a fraction: 0.1234 -> "12,34%".
pub fn format_percent(value: Option<f64>) -> String {
    let Some(fraction) = value else {
        return MISSING_TEXT.to_string();
    };

    let fixed = format!("{:.2}", fraction * 100.0);
    let (sign, body) = split_sign(&fixed);
    let (int_part, dec_part) = body.split_once('.').unwrap_or((body, "00"));
    let sign = if int_part.chars().all(|c| c == '0') && dec_part.chars().all(|c| c == '0') {
        ""
    } else {
        sign
    };

    format!("{}{},{}%", sign, group_thousands(int_part), dec_part)
}

fn split_sign(text: &str) -> (&str, &str) {
    match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_danish_separators() {
        assert_eq!(parse_numeric("1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_numeric("1234,5"), Some(1234.5));
        assert_eq!(parse_numeric("abc"), None);
    }

    #[test]
    fn test_parse_dot_grouping() {
        assert_eq!(parse_numeric("1.000.000"), Some(1_000_000.0));
        assert_eq!(parse_numeric("900.000"), Some(900_000.0));
        assert_eq!(parse_numeric("-2.200.000"), Some(-2_200_000.0));
        assert_eq!(parse_numeric("1234.5"), Some(1234.5));
        assert_eq!(parse_numeric("0.250"), Some(0.25));
        assert_eq!(parse_numeric("12.50"), Some(12.5));
    }

    #[test]
    fn test_parse_whitespace_and_failures() {
        assert_eq!(parse_numeric(" 1 234 567 "), Some(1_234_567.0));
        assert_eq!(parse_numeric("1\u{a0}000,5"), Some(1000.5));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("   "), None);
        assert_eq!(parse_numeric("1,234,567"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
    }

    #[test]
    fn test_parse_never_coerces_to_zero() {
        for raw in ["n/a", "-", "kr.", "ikke oplyst"] {
            assert_eq!(parse_numeric(raw), None, "{}", raw);
        }
        assert_eq!(parse_numeric("0"), Some(0.0));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234567.89), "1.234.568");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(-2500000.0), "-2.500.000");
        assert_eq!(format_amount(1000.0), "1.000");
    }

    #[test]
    fn test_format_amount_distinguishes_missing_unknown_zero() {
        let missing = format_amount(None::<f64>);
        let unknown = format_amount(Amount::Unknown);
        let zero = format_amount(0.0);

        assert_eq!(zero, "0");
        assert_ne!(missing, zero);
        assert_ne!(unknown, zero);
        assert_ne!(missing, unknown);
        assert_eq!(format_amount(-0.2), "0");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(0.4)), "40,00%");
        assert_eq!(format_percent(Some(0.1234)), "12,34%");
        assert_eq!(format_percent(Some(-0.05)), "-5,00%");
        assert_eq!(format_percent(Some(12.5)), "1.250,00%");
        assert_eq!(format_percent(Some(0.0)), "0,00%");
        assert_eq!(format_percent(None), "-");
    }
}

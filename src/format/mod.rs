//! Display formatting for numbers and timestamps.

use crate::records::Amount;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::debug;

/// Placeholder for a missing value.
pub const DASH: &str = "-";

/// Rendered in place of a timestamp that does not parse.
pub const INVALID_TIME: &str = "Invalid Date";

/// Format an amount with en-US digit grouping and at most two decimals,
/// rounding half away from zero on the decimal text.
///
/// Text that does not parse as a finite number is returned unchanged.
pub fn format_number(value: Option<&Amount>) -> String {
    match value {
        None => DASH.to_string(),
        Some(Amount::Number(n)) if n.is_finite() => to_decimal(&n.to_string())
            .map(group_decimal)
            .unwrap_or_else(|| group_wide(*n)),
        Some(Amount::Number(n)) => n.to_string(),
        Some(Amount::Text(s)) => {
            let trimmed = s.trim();
            if let Some(d) = to_decimal(trimmed) {
                return group_decimal(d);
            }
            // Outside Decimal's range but still a finite float.
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() && !trimmed.is_empty() => group_wide(n),
                _ => s.clone(),
            }
        }
    }
}

fn to_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn group_decimal(d: Decimal) -> String {
    let rounded = d
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_digits, frac) = match text.split_once('.') {
        Some((int_digits, frac)) => (int_digits, frac),
        None => (text.as_str(), ""),
    };
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{}{}", sign, group_digits(int_digits))
    } else {
        format!("{}{}.{}", sign, group_digits(int_digits), frac)
    }
}

/// Values Decimal cannot hold: huge magnitudes carry no cents worth showing,
/// vanishing ones round to zero.
fn group_wide(n: f64) -> String {
    if n.abs() < 1.0 {
        return "0".to_string();
    }
    let digits = n.abs().trunc().to_string();
    if n < 0.0 {
        format!("-{}", group_digits(&digits))
    } else {
        group_digits(&digits)
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS.sss` in UTC.
pub fn format_time(value: Option<&str>) -> String {
    let raw = match value {
        Some(s) if !s.is_empty() => s,
        _ => return DASH.to_string(),
    };
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => {
            debug!(timestamp = raw, "unparseable timestamp");
            INVALID_TIME.to_string()
        }
    }
}

/// Accepts RFC 3339 with any offset, a naive ISO date-time (taken as UTC, the
/// way the agent writes `utcnow()`), or a bare date at midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `"-"` for a missing field, the text itself otherwise.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or(DASH).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Amount {
        Amount::Text(s.to_string())
    }

    #[test]
    fn test_format_number_missing() {
        assert_eq!(format_number(None), "-");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(Some(&text("1234.5"))), "1,234.5");
        assert_eq!(format_number(Some(&Amount::Number(1234567.891))), "1,234,567.89");
        assert_eq!(format_number(Some(&Amount::Number(999.0))), "999");
        assert_eq!(format_number(Some(&Amount::Number(1000.0))), "1,000");
        assert_eq!(format_number(Some(&Amount::Number(0.0))), "0");
        assert_eq!(format_number(Some(&text(" 20000 "))), "20,000");
    }

    #[test]
    fn test_format_number_rounding() {
        assert_eq!(format_number(Some(&Amount::Number(1.999))), "2");
        assert_eq!(format_number(Some(&Amount::Number(0.125))), "0.13");
        assert_eq!(format_number(Some(&Amount::Number(10.10))), "10.1");
        assert_eq!(format_number(Some(&Amount::Number(-1234.5))), "-1,234.5");
        assert_eq!(format_number(Some(&Amount::Number(-0.001))), "0");
    }

    #[test]
    fn test_format_number_half_cents_round_up() {
        for (input, expected) in [
            ("1.005", "1.01"),
            ("0.145", "0.15"),
            ("0.285", "0.29"),
            ("1.015", "1.02"),
            ("-1.005", "-1.01"),
        ] {
            assert_eq!(format_number(Some(&text(input))), expected, "text {}", input);
            let n: f64 = input.parse().unwrap();
            assert_eq!(format_number(Some(&Amount::Number(n))), expected, "number {}", input);
        }
    }

    #[test]
    fn test_format_number_every_half_cent() {
        let mut mismatches = Vec::new();
        for k in 0..200_000u64 {
            let input = format!("{}.{:02}5", k / 100, k % 100);
            let expected = Decimal::from_str(&input)
                .unwrap()
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize();
            let expected = group_decimal(expected);
            let n: f64 = input.parse().unwrap();
            let got = format_number(Some(&Amount::Number(n)));
            if got != expected {
                mismatches.push((input, got, expected));
            }
        }
        assert!(
            mismatches.is_empty(),
            "{} mismatches, e.g. {:?}",
            mismatches.len(),
            &mismatches[..mismatches.len().min(3)]
        );
    }

    #[test]
    fn test_format_number_wide_values() {
        assert_eq!(format_number(Some(&text("1e3"))), "1,000");
        assert_eq!(
            format_number(Some(&Amount::Number(1e30))),
            "1,000,000,000,000,000,000,000,000,000,000"
        );
        assert_eq!(
            format_number(Some(&Amount::Number(-2.5e30))),
            "-2,500,000,000,000,000,000,000,000,000,000"
        );
        assert_eq!(format_number(Some(&Amount::Number(1e-300))), "0");
    }

    #[test]
    fn test_format_number_fallback_to_text() {
        assert_eq!(format_number(Some(&text("abc"))), "abc");
        assert_eq!(format_number(Some(&text(""))), "");
        assert_eq!(format_number(Some(&text("inf"))), "inf");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "-");
        assert_eq!(format_time(Some("")), "-");
        assert_eq!(
            format_time(Some("2024-01-02T03:04:05.000Z")),
            "2024-01-02 03:04:05.000"
        );
        assert_eq!(
            format_time(Some("2024-01-02T03:04:05.123456")),
            "2024-01-02 03:04:05.123"
        );
        assert_eq!(
            format_time(Some("2024-01-02T05:04:05+02:00")),
            "2024-01-02 03:04:05.000"
        );
        assert_eq!(format_time(Some("2024-01-03")), "2024-01-03 00:00:00.000");
    }

    #[test]
    fn test_format_time_invalid() {
        assert_eq!(format_time(Some("yesterday")), INVALID_TIME);
        assert_eq!(format_time(Some("2024-13-45")), INVALID_TIME);
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("ok")), "ok");
    }
}

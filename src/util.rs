// Utility helpers for parsing, rounding and number formatting.
//
// Dataset exports are messy (thousands separators, blank cells, mixed-case
// booleans); everything that touches raw strings lives here so the scoring
// code only ever sees typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Counts (amendments, stoppages). Blank means zero.
pub fn parse_count_safe(s: Option<&str>) -> Option<u32> {
    let s = s.map(str::trim).unwrap_or("");
    if s.is_empty() {
        return Some(0);
    }
    s.parse::<u32>().ok()
}

pub fn parse_bool_safe(s: Option<&str>) -> Option<bool> {
    let s = s.map(str::trim).unwrap_or("");
    match s.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" | "nao" | "não" => Some(false),
        "true" | "yes" | "y" | "1" | "sim" | "s" => Some(true),
        _ => None,
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Whole days from `start` to `end`, never less than one.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

/// Round to the nearest integer with halves going towards +∞, so
/// `2.5 -> 3` and `-2.5 -> -2`.
pub fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(x * factor) / factor
}

/// Integer mean of a running sum; 0 for an empty set.
pub fn mean_rounded(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round_half_up(sum / count as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `1,234,567.89` style thousands separators.
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Whole-real amounts the way the dashboards print them: `R$ 3.000.000`.
pub fn format_brl(value: f64) -> String {
    let rounded = round_half_up(value) as i64;
    let body = rounded.abs().to_formatted_string(&Locale::pt);
    if rounded < 0 {
        format!("-R$ {}", body)
    } else {
        format!("R$ {}", body)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_strips_separators_and_rejects_text() {
        assert_eq!(parse_f64_safe(Some(" 3,000,000.50 ")), Some(3_000_000.5));
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn counts_and_flags_default_when_blank() {
        assert_eq!(parse_count_safe(None), Some(0));
        assert_eq!(parse_count_safe(Some(" 3 ")), Some(3));
        assert_eq!(parse_count_safe(Some("-1")), None);
        assert_eq!(parse_bool_safe(Some("Sim")), Some(true));
        assert_eq!(parse_bool_safe(Some("")), Some(false));
        assert_eq!(parse_bool_safe(Some("maybe")), None);
    }

    #[test]
    fn days_between_floors_at_one() {
        let d = |s| parse_date_safe(Some(s)).expect("valid date");
        assert_eq!(days_between(d("2024-01-01"), d("2024-04-10")), 100);
        assert_eq!(days_between(d("2024-01-01"), d("2024-01-01")), 1);
        assert_eq!(days_between(d("2024-02-01"), d("2024-01-01")), 1);
    }

    #[test]
    fn rounding_sends_halves_up() {
        assert_eq!(round_half_up(98.5), 99.0);
        assert_eq!(round_half_up(2.4), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_to(-3.14159, 2), -3.14);
        assert_eq!(mean_rounded(0.0, 0), 0.0);
        assert_eq!(mean_rounded(5.0, 2), 3.0);
    }

    #[test]
    fn formats_numbers_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 0), "-42");
        assert_eq!(format_brl(3_000_000.0), "R$ 3.000.000");
        assert_eq!(format_int(9855usize), "9,855");
    }
}

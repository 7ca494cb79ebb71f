//! Human-readable number rendering for console and log output.
//!
//! Report files use plain fixed-point values; these helpers are for the
//! lines a person reads in the terminal.

/// Format `value` with `decimals` fixed decimals and comma thousands separators.
///
/// # Examples
///
/// ```
/// use energy_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format an energy amount as `"<n> kWh"` with two decimals.
///
/// ```
/// use energy_core::formatting::format_kwh;
///
/// assert_eq!(format_kwh(18.0), "18.00 kWh");
/// assert_eq!(format_kwh(12_500.456), "12,500.46 kWh");
/// ```
pub fn format_kwh(value: f64) -> String {
    format!("{} kWh", format_number(value, 2))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    digits
        .chars()
        .enumerate()
        .fold(String::with_capacity(len + len / 3), |mut acc, (i, c)| {
            if i > 0 && (len - i) % 3 == 0 {
                acc.push(',');
            }
            acc.push(c);
            acc
        })
}

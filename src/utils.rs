use std::time::Duration;

/// Formats an elapsed time as `HH:MM:SS` for the end-of-run summary.
///
/// # Arguments
///
/// * `duration` - Elapsed time; sub-second precision is dropped
///
/// # Returns
///
/// A zero-padded string such as `"01:01:01"`. Hours are not wrapped at 24.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Parses Brazilian-formatted numeric text ("1.234,56", "R$ 99,90", "2") into a
/// non-negative number.
///
/// Periods are thousands separators and the comma is the decimal separator. Any
/// other non-digit text (currency prefix, units) is ignored.
///
/// # Returns
///
/// The parsed value, clamped to zero: a minus sign before the first digit
/// ("-5,00", "R$ -5,00") and unparseable input both yield `0.0`.
pub fn parse_localized_number(text: &str) -> f64 {
    let negative = text
        .chars()
        .take_while(|c| !c.is_ascii_digit())
        .any(|c| c == '-' || c == '\u{2212}');
    if negative {
        return 0.0;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Formats a value as Brazilian currency, independent of the host locale.
///
/// `1234.5` becomes `"R$ 1.234,50"`. Negative input is treated as zero.
pub fn format_currency(value: f64) -> String {
    let cents = if value.is_finite() && value > 0.0 {
        (value * 100.0).round() as u64
    } else {
        0
    };
    let integer = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("R$ {grouped},{fraction:02}")
}

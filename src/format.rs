//! Display formatting for counts and timestamps.

use chrono::DateTime;

/// `1234567` -> `"1,234,567"`.
pub fn format_number(num: i64) -> String {
  let digits = num.unsigned_abs().to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
  if num < 0 {
    grouped.push('-');
  }
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }
  grouped
}

/// Unix seconds to a long date such as `"5 January 2024"` (UTC).
///
/// Out-of-range timestamps yield an empty string.
pub fn format_date(timestamp: i64) -> String {
  DateTime::from_timestamp(timestamp, 0)
    .map(|dt| dt.format("%-d %B %Y").to_string())
    .unwrap_or_default()
}

/// `"1 item"`, `"1,234 items"`, or `""` when there is nothing to count.
pub fn format_file_count(count: i64) -> String {
  if count <= 0 {
    return String::new();
  }
  let noun = if count == 1 { "item" } else { "items" };
  format!("{} {}", format_number(count), noun)
}

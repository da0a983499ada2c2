use chrono::{Local, NaiveDate};

/// `Rp. 1.250.000`, the id-ID grouping used across the pages.
pub fn format_rupiah(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}Rp. {grouped}")
}

/// Reads an amount typed with thousands separators, e.g. "150.000".
/// Everything except digits is ignored.
/// Reads the digits of a grouped amount. Digit runs past `i64::MAX` saturate
/// so callers can reject them with a bound check.
pub fn parse_digits(input: &str) -> Option<i64> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(i64::MAX))
}

pub fn parse_whole(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

pub fn today_ymd() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

pub fn current_month() -> String {
    Local::now().date_naive().format("%Y-%m").to_string()
}

pub fn selected_month(month: Option<&str>) -> String {
    month
        .map(str::trim)
        .filter(|value| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok())
        .map(str::to_string)
        .unwrap_or_else(current_month)
}

use chrono::{DateTime, Datelike, Utc};

// ============================================================================
// Order Numbers - YYYY-NNNNNN
// ============================================================================

pub const ORDER_SEQUENCE_MODULUS: u64 = 1_000_000;

pub fn format_order_number(year: i32, sequence: u64) -> String {
    format!("{:04}-{:06}", year, sequence % ORDER_SEQUENCE_MODULUS)
}

/// Split `YYYY-NNNNNN` into year and sequence
pub fn parse_order_number(value: &str) -> Option<(i32, u64)> {
    let (year, sequence) = value.split_once('-')?;
    if year.len() != 4 || sequence.len() != 6 {
        return None;
    }
    if !year.bytes().chain(sequence.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((year.parse().ok()?, sequence.parse().ok()?))
}

/// Clock-derived number for tests and demos; collides within the same second
pub fn order_number_from_clock(now: DateTime<Utc>) -> String {
    let seconds = now.timestamp().rem_euclid(ORDER_SEQUENCE_MODULUS as i64) as u64;
    format_order_number(now.year(), seconds)
}

//! Invoice number assignment.
//!
//! Numbers are `{year}{seq:04}`, e.g. `20250007` for the 7th invoice of 2025.
//! The sequence either resets each calendar year (default) or counts every
//! invoice ever created, depending on configuration. The read of the previous
//! maximum and the insert of the new number are not atomic; the unique
//! constraint on `invoices.number` makes a concurrent duplicate fail loudly
//! instead of silently reusing a number.

/// Render a year and sequence into the invoice number string.
pub fn format_number(year: i32, seq: i64) -> String {
    format!("{year}{seq:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pads_to_four_digits() {
        assert_eq!(format_number(2025, 1), "20250001");
        assert_eq!(format_number(2025, 42), "20250042");
        assert_eq!(format_number(2024, 1234), "20241234");
    }

    #[test]
    fn wide_sequences_are_not_truncated() {
        assert_eq!(format_number(2025, 10001), "202510001");
    }
}

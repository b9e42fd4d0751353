//! Text parsing for client output.
//!
//! The external client emits plain text lines of the form `key: value`, with
//! each logical reading introduced by a `YYYY-MM-DD HH:MM:SS` line when the
//! client streams continuously. Lines that fit neither shape are noise and are
//! dropped without complaint.

use std::collections::HashMap;

use chrono::NaiveDateTime;

/// Length of the `YYYY-MM-DD HH:MM:SS` prefix.
const STAMP_LEN: usize = 19;

/// Parse client output into a key/value mapping.
///
/// Each line is split on colons; only lines carrying exactly one
/// colon-delimited pair are kept, with key and value trimmed. Duplicate keys
/// keep the last occurrence. Everything else is silently dropped.
pub fn parse_fields(output: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in output.lines() {
        let mut parts = line.split(':');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }
    fields
}

/// Whether a line starts a new logical reading.
///
/// Matches a strict zero-padded `YYYY-MM-DD HH:MM:SS` prefix followed by
/// whitespace. The line readers strip the trailing newline, so end of line
/// counts as that whitespace.
pub fn is_reading_boundary(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < STAMP_LEN {
        return false;
    }
    for (i, &b) in bytes[..STAMP_LEN].iter().enumerate() {
        let ok = match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return false;
        }
    }
    match bytes.get(STAMP_LEN) {
        None => true,
        Some(b) => b.is_ascii_whitespace(),
    }
}

/// Epoch seconds from the leading timestamp of a boundary line (UTC).
///
/// Returns `None` when the line is not a reading boundary or the stamp does
/// not name a real calendar time.
pub fn parse_timestamp(line: &str) -> Option<i64> {
    if !is_reading_boundary(line) {
        return None;
    }
    let dt = NaiveDateTime::parse_from_str(&line[..STAMP_LEN], "%Y-%m-%d %H:%M:%S").ok()?;
    Some(dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_fields
    // -----------------------------------------------------------------------

    #[test]
    fn parse_fields_basic() {
        let fields = parse_fields("battery.charge: 87.5\ninput.voltage: 120.3\n");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["battery.charge"], "87.5");
        assert_eq!(fields["input.voltage"], "120.3");
    }

    #[test]
    fn parse_fields_is_idempotent() {
        let output = "battery.charge: 87.5\nups.status: OL\nnoise\n";
        assert_eq!(parse_fields(output), parse_fields(output));
    }

    #[test]
    fn parse_fields_drops_lines_without_colon() {
        let fields = parse_fields("no colon here\nbattery.charge: 90\n");
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("battery.charge"));
    }

    #[test]
    fn parse_fields_drops_lines_with_two_colons() {
        // exactly one colon-delimited pair per line
        let fields = parse_fields("a:b:c\n");
        assert!(fields.is_empty());
    }

    #[test]
    fn parse_fields_trims_key_and_value() {
        let fields = parse_fields("  battery.charge :  87.5  \n");
        assert_eq!(fields["battery.charge"], "87.5");
    }

    #[test]
    fn parse_fields_last_occurrence_wins() {
        let fields = parse_fields("battery.charge: 90\nbattery.charge: 89\n");
        assert_eq!(fields["battery.charge"], "89");
    }

    #[test]
    fn parse_fields_empty_output() {
        assert!(parse_fields("").is_empty());
    }

    #[test]
    fn parse_fields_value_without_text() {
        let fields = parse_fields("ups.alarm:\n");
        assert_eq!(fields["ups.alarm"], "");
    }

    // -----------------------------------------------------------------------
    // is_reading_boundary
    // -----------------------------------------------------------------------

    #[test]
    fn boundary_with_trailing_text_matches() {
        assert!(is_reading_boundary("2025-01-01 00:00:00 extra text"));
    }

    #[test]
    fn boundary_without_zero_padding_does_not_match() {
        assert!(!is_reading_boundary("2025-1-1 00:00:00"));
    }

    #[test]
    fn boundary_at_end_of_line_matches() {
        // the reader strips the newline the client emitted after the stamp
        assert!(is_reading_boundary("2025-01-01 00:00:00"));
        assert!(is_reading_boundary("2025-01-01 00:00:00\t"));
    }

    #[test]
    fn boundary_followed_by_non_whitespace_does_not_match() {
        assert!(!is_reading_boundary("2025-01-01 00:00:00Z"));
    }

    #[test]
    fn boundary_rejects_field_lines() {
        assert!(!is_reading_boundary("battery.charge: 87.5"));
        assert!(!is_reading_boundary("ups.status: OL"));
    }

    #[test]
    fn boundary_rejects_short_and_malformed_lines() {
        assert!(!is_reading_boundary(""));
        assert!(!is_reading_boundary("2025-01-01"));
        assert!(!is_reading_boundary("2025/01/01 00:00:00"));
        assert!(!is_reading_boundary("2025-01-01T00:00:00"));
        assert!(!is_reading_boundary("2025-01-01 00.00.00"));
    }

    // -----------------------------------------------------------------------
    // parse_timestamp
    // -----------------------------------------------------------------------

    #[test]
    fn parse_timestamp_known_value() {
        // 2025-01-01 00:00:00 UTC
        assert_eq!(parse_timestamp("2025-01-01 00:00:00"), Some(1735689600));
    }

    #[test]
    fn parse_timestamp_ignores_trailing_text() {
        assert_eq!(
            parse_timestamp("2025-01-01 00:00:00 extra text"),
            Some(1735689600)
        );
    }

    #[test]
    fn parse_timestamp_rejects_non_boundaries() {
        assert_eq!(parse_timestamp("battery.charge: 87.5"), None);
        assert_eq!(parse_timestamp("2025-1-1 00:00:00"), None);
    }

    #[test]
    fn parse_timestamp_rejects_impossible_dates() {
        // shape matches, calendar does not
        assert_eq!(parse_timestamp("2025-13-01 00:00:00"), None);
        assert_eq!(parse_timestamp("2025-02-30 00:00:00"), None);
    }
}

//! Date/time helpers.

/// Convert a SQLite `datetime('now')` string (UTC) to RFC 3339.
///
/// Values that already look like RFC 3339 are returned unchanged.
pub fn to_rfc3339(datetime_str: &str) -> String {
    if datetime_str.contains('T') {
        return datetime_str.to_string();
    }
    format!("{}Z", datetime_str.replace(' ', "T"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rfc3339_sqlite_format() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_to_rfc3339_passthrough() {
        assert_eq!(to_rfc3339("2024-01-15T10:30:00Z"), "2024-01-15T10:30:00Z");
    }
}

//! EXIF timestamp normalization.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

const DATETIME_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f", // EXIF, optional subseconds
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y:%m:%d", "%Y-%m-%d"];

/// Normalize an EXIF timestamp to ISO 8601 (`YYYY-MM-DDTHH:MM:SS`).
///
/// A trailing `+hh:mm` or `Z` zone is dropped. Date-only values become
/// midnight. Subseconds are written as microseconds (`.250000`) and left off
/// when zero. Anything unparseable is returned unchanged.
pub fn standardize_datetime(raw: &str) -> String {
    let cleaned = raw
        .split('+')
        .next()
        .and_then(|s| s.split('Z').next())
        .unwrap_or(raw)
        .trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, format) {
            return iso(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return iso(dt);
            }
        }
    }

    raw.to_string()
}

fn iso(dt: NaiveDateTime) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

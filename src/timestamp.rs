// src/timestamp.rs
//
// Lenient timestamp parsing shared by the record mapping and the task form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// A zone-less timestamp: full ISO, minute precision (as sent by a
/// `datetime-local` input) or a bare date at midnight.
fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// RFC 3339, or a zone-less timestamp read as wall time in `tz`.
pub fn parse_in<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_naive(text)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn accepts_every_supported_shape() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 20, 17, 0, 0).unwrap();
        for text in [
            "2026-10-20T17:00:00Z",
            "2026-10-20T17:00:00.000Z",
            "2026-10-20T19:00:00+02:00",
            "2026-10-20T17:00:00",
            "2026-10-20T17:00",
            "2026-10-20 17:00:00",
            " 2026-10-20T17:00 ",
        ] {
            assert_eq!(parse_in(text, &Utc), Some(expected), "{}", text);
        }
        assert_eq!(
            parse_in("2026-10-20", &Utc),
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn zone_less_input_is_wall_time_in_the_given_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_in("2026-10-20T17:00", &zone),
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 15, 0, 0).unwrap())
        );
        // an explicit offset wins over the zone
        assert_eq!(
            parse_in("2026-10-20T17:00:00Z", &zone),
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_in("next tuesday", &Utc), None);
        assert_eq!(parse_in("2026-13-40", &Utc), None);
    }
}

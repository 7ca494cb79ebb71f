use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses meter timestamps and maps instants onto calendar buckets.
///
/// All bucketing (hour, day, week) happens in the same zone so the three
/// series always partition the readings identically.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self { tz: Tz::UTC }
    }
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Parse a timestamp cell into a UTC [`DateTime`].
    ///
    /// Strings carrying an offset (RFC 3339, `Z` suffix) are converted
    /// directly; naive strings are interpreted as wall-clock time in the
    /// handler's zone. Returns `None` for empty or unrecognised input.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        const DATETIME_FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%d/%m/%Y %H:%M:%S",
            "%d/%m/%Y %H:%M",
        ];
        for fmt in DATETIME_FMTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.from_local(naive);
            }
        }

        const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
        for fmt in DATE_FMTS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return self.from_local(date.and_hms_opt(0, 0, 0)?);
            }
        }

        None
    }

    /// Wall-clock time of `dt` in the handler's zone.
    pub fn to_local(&self, dt: DateTime<Utc>) -> NaiveDateTime {
        dt.with_timezone(&self.tz).naive_local()
    }

    /// Calendar day containing `dt`.
    pub fn day_bucket(&self, dt: DateTime<Utc>) -> NaiveDate {
        self.to_local(dt).date()
    }

    /// Week containing `dt`, keyed by the Sunday that closes it.
    ///
    /// Weeks run Monday through Sunday.
    pub fn week_bucket(&self, dt: DateTime<Utc>) -> NaiveDate {
        week_ending_sunday(self.day_bucket(dt))
    }

    /// Start of the clock hour containing `dt`.
    pub fn hour_bucket(&self, dt: DateTime<Utc>) -> NaiveDateTime {
        let local = self.to_local(dt);
        local
            .date()
            .and_hms_opt(local.hour(), 0, 0)
            .unwrap_or(local)
    }

    /// Render `dt` for the cleaned dataset (`%Y-%m-%dT%H:%M:%S`).
    pub fn format_timestamp(&self, dt: DateTime<Utc>) -> String {
        self.to_local(dt).format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Render `dt` for the highlights file.
    ///
    /// Minutes precision, with seconds appended only when non-zero.
    pub fn format_display_time(&self, dt: DateTime<Utc>) -> String {
        let local = self.to_local(dt);
        if local.second() == 0 && local.nanosecond() == 0 {
            local.format("%Y-%m-%dT%H:%M").to_string()
        } else {
            local.format("%Y-%m-%dT%H:%M:%S").to_string()
        }
    }

    fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        // Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The Sunday on or after `date`.
pub fn week_ending_sunday(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // ── TimezoneHandler::new ─────────────────────────────────────────────────

    #[test]
    fn test_new_valid_timezone() {
        let handler = TimezoneHandler::new("America/New_York");
        assert_eq!(handler.tz(), Tz::America__New_York);
    }

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Mars/Olympus");
        assert_eq!(handler.tz(), Tz::UTC);
    }

    // ── parse_timestamp ──────────────────────────────────────────────────────

    #[test]
    fn test_parse_minutes_precision() {
        let handler = TimezoneHandler::default();
        let dt = handler.parse_timestamp("2024-01-01T12:00").unwrap();
        assert_eq!(dt, utc(2024, 1, 1, 12, 0));
    }

    #[test]
    fn test_parse_space_separated_with_seconds() {
        let handler = TimezoneHandler::default();
        let dt = handler.parse_timestamp("2024-03-05 07:15:30").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 5, 7, 15, 30).unwrap());
    }

    #[test]
    fn test_parse_z_suffix_and_offset() {
        let handler = TimezoneHandler::default();
        assert_eq!(
            handler.parse_timestamp("2024-01-15T10:30:00Z").unwrap(),
            utc(2024, 1, 15, 10, 30)
        );
        assert_eq!(
            handler.parse_timestamp("2024-01-15T12:00:00+02:00").unwrap(),
            utc(2024, 1, 15, 10, 0)
        );
    }

    #[test]
    fn test_parse_date_only() {
        let handler = TimezoneHandler::default();
        assert_eq!(
            handler.parse_timestamp("2024-02-29").unwrap(),
            utc(2024, 2, 29, 0, 0)
        );
    }

    #[test]
    fn test_parse_naive_uses_handler_zone() {
        let handler = TimezoneHandler::new("Asia/Tokyo");
        // 09:00 in Tokyo is midnight UTC.
        assert_eq!(
            handler.parse_timestamp("2024-01-01 09:00").unwrap(),
            utc(2024, 1, 1, 0, 0)
        );
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_timestamp("").is_none());
        assert!(handler.parse_timestamp("   ").is_none());
        assert!(handler.parse_timestamp("not-a-date").is_none());
        assert!(handler.parse_timestamp("2024-13-01").is_none());
    }

    // ── buckets ──────────────────────────────────────────────────────────────

    #[test]
    fn test_week_ending_sunday() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(week_ending_sunday(monday), sunday);
        assert_eq!(week_ending_sunday(sunday), sunday);
        assert_eq!(
            week_ending_sunday(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
    }

    #[test]
    fn test_day_and_hour_bucket_in_zone() {
        let handler = TimezoneHandler::new("America/New_York");
        // 03:30 UTC on Jan 2 is 22:30 on Jan 1 in New York.
        let dt = utc(2024, 1, 2, 3, 30);
        assert_eq!(
            handler.day_bucket(dt),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            handler.hour_bucket(dt),
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(22, 0, 0)
                .unwrap()
        );
    }

    // ── formatting ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_display_time() {
        let handler = TimezoneHandler::default();
        assert_eq!(
            handler.format_display_time(utc(2024, 1, 1, 0, 0)),
            "2024-01-01T00:00"
        );
        let with_secs = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 42).unwrap();
        assert_eq!(handler.format_display_time(with_secs), "2024-01-01T00:00:42");
    }

    #[test]
    fn test_format_timestamp_full_precision() {
        let handler = TimezoneHandler::default();
        assert_eq!(
            handler.format_timestamp(utc(2024, 1, 1, 6, 0)),
            "2024-01-01T06:00:00"
        );
    }
}

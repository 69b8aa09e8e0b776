use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::InputError;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// ISO 8601 layouts RFC 3339 rejects: minutes-only times, offsets without a
/// colon and a bare `Z` after minutes.
const ZONED_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

/// Zone-less date-time layouts a generic parser reads as local wall-clock time.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A calendar date pinned to local midday.
///
/// Holding the day at 12:00 keeps later conversions through any time zone
/// within the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalDay(NaiveDateTime);

impl LocalDay {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(midday()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// `YYYY-MM-DD` key used to index days and to talk to the record store.
    pub fn key(&self) -> String {
        self.0.format(DAY_KEY_FORMAT).to_string()
    }

    /// The midday instant of this day in `zone`.
    pub fn in_zone<Tz: TimeZone>(&self, zone: &Tz) -> Option<DateTime<Tz>> {
        zone.from_local_datetime(&self.0).earliest()
    }
}

impl From<NaiveDate> for LocalDay {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for LocalDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl Serialize for LocalDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl<'de> Deserialize<'de> for LocalDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateNormalizer::utc()
            .try_normalize_str(&raw)
            .map_err(serde::de::Error::custom)
    }
}

fn midday() -> NaiveTime {
    NaiveTime::default() + Duration::hours(12)
}

/// Date value as delivered by the record store: a string in one of several
/// layouts, or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Millis(f64),
    Text(String),
}

impl From<&str> for RawDate {
    fn from(value: &str) -> Self {
        RawDate::Text(value.to_string())
    }
}

impl From<String> for RawDate {
    fn from(value: String) -> Self {
        RawDate::Text(value)
    }
}

impl From<LocalDay> for RawDate {
    fn from(day: LocalDay) -> Self {
        RawDate::Text(day.key())
    }
}

impl fmt::Display for RawDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDate::Millis(ms) => write!(f, "{ms}"),
            RawDate::Text(text) => f.write_str(text),
        }
    }
}

/// Turns heterogeneous date inputs into [`LocalDay`] values as seen from the
/// viewer's time zone.
#[derive(Debug, Clone)]
pub struct DateNormalizer<Tz: TimeZone = Local> {
    zone: Tz,
}

impl DateNormalizer<Local> {
    pub fn local() -> Self {
        Self { zone: Local }
    }
}

impl Default for DateNormalizer<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl DateNormalizer<Utc> {
    pub fn utc() -> Self {
        Self { zone: Utc }
    }
}

impl<Tz: TimeZone> DateNormalizer<Tz> {
    pub fn with_zone(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> &Tz {
        &self.zone
    }

    /// Tolerant entry point: unreadable input yields `None` ("no date").
    pub fn normalize(&self, raw: &RawDate) -> Option<LocalDay> {
        match self.try_normalize(raw) {
            Ok(day) => Some(day),
            Err(err) => {
                tracing::debug!(%err, "date excluded from aggregation");
                None
            }
        }
    }

    pub fn normalize_str(&self, input: &str) -> Option<LocalDay> {
        self.normalize(&RawDate::Text(input.to_string()))
    }

    pub fn try_normalize(&self, raw: &RawDate) -> Result<LocalDay, InputError> {
        match raw {
            RawDate::Text(text) => self.try_normalize_str(text),
            RawDate::Millis(ms) => self.from_millis(*ms),
        }
    }

    pub fn try_normalize_str(&self, input: &str) -> Result<LocalDay, InputError> {
        let trimmed = input.trim();

        if let Some(day) = parse_plain_date(trimmed) {
            return Ok(day);
        }

        // Zoned timestamps keep the UTC calendar day the server stored.
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(utc_day_of(&instant));
        }
        for layout in ZONED_LAYOUTS {
            if let Ok(instant) = DateTime::parse_from_str(trimmed, layout) {
                return Ok(utc_day_of(&instant));
            }
        }

        for layout in NAIVE_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, layout) {
                return Ok(LocalDay::from_date(naive.date()));
            }
        }

        if let Ok(instant) = DateTime::parse_from_rfc2822(trimmed) {
            return Ok(self.local_day_of(&instant));
        }

        Err(InputError::InvalidDateInput(input.to_string()))
    }

    fn from_millis(&self, ms: f64) -> Result<LocalDay, InputError> {
        if !ms.is_finite() {
            return Err(InputError::InvalidDateInput(ms.to_string()));
        }
        Utc.timestamp_millis_opt(ms.trunc() as i64)
            .single()
            .map(|instant| self.local_day_of(&instant))
            .ok_or_else(|| InputError::InvalidDateInput(ms.to_string()))
    }

    fn local_day_of<T: TimeZone>(&self, instant: &DateTime<T>) -> LocalDay {
        LocalDay::from_date(instant.with_timezone(&self.zone).date_naive())
    }
}

fn utc_day_of<T: TimeZone>(instant: &DateTime<T>) -> LocalDay {
    LocalDay::from_date(instant.with_timezone(&Utc).date_naive())
}

/// Strict `YYYY-MM-DD`, built from its components and never through an
/// instant-based parser.
fn parse_plain_date(input: &str) -> Option<LocalDay> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let mut parts = input.split('-');
    let year = parse_digits(parts.next()?)?;
    let month = parse_digits(parts.next()?)?;
    let day = parse_digits(parts.next()?)?;
    LocalDay::from_ymd(year as i32, month, day)
}

fn parse_digits(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc_minus_five() -> DateNormalizer<FixedOffset> {
        DateNormalizer::with_zone(FixedOffset::west_opt(5 * 3600).unwrap())
    }

    fn utc_plus_nine() -> DateNormalizer<FixedOffset> {
        DateNormalizer::with_zone(FixedOffset::east_opt(9 * 3600).unwrap())
    }

    #[test]
    fn plain_dates_keep_their_components_in_any_zone() {
        for input in ["2024-03-05", "2024-01-01", "2024-12-31", "2024-02-29"] {
            let west = utc_minus_five().normalize_str(input).expect("west");
            let east = utc_plus_nine().normalize_str(input).expect("east");
            assert_eq!(west, east);
            assert_eq!(west.key(), input);
        }
    }

    #[test]
    fn utc_timestamps_use_the_utc_calendar_day() {
        let day = utc_minus_five()
            .normalize_str("2024-03-31T23:00:00Z")
            .expect("timestamp");
        assert_eq!((day.year(), day.month(), day.day()), (2024, 3, 31));

        let day = utc_plus_nine()
            .normalize_str("2024-03-31T23:00:00.000Z")
            .expect("timestamp");
        assert_eq!(day.key(), "2024-03-31");
    }

    #[test]
    fn minute_precision_zulu_timestamps_use_the_utc_day() {
        for input in ["2024-03-31T23:00Z", "2024-03-31 23:00Z"] {
            let west = utc_minus_five().normalize_str(input).expect(input);
            let east = utc_plus_nine().normalize_str(input).expect(input);
            assert_eq!(west.key(), "2024-03-31");
            assert_eq!(east.key(), "2024-03-31");
        }
    }

    #[test]
    fn offsets_without_colon_are_accepted() {
        let day = utc_minus_five()
            .normalize_str("2024-03-31T23:00:00+0000")
            .expect("basic offset");
        assert_eq!(day.key(), "2024-03-31");

        let day = utc_plus_nine()
            .normalize_str("2024-04-01T01:30:00.250+0200")
            .expect("fractional seconds");
        assert_eq!(day.key(), "2024-03-31");
    }

    #[test]
    fn minute_precision_offsets_are_read_as_utc_instants() {
        let day = utc_minus_five()
            .normalize_str("2024-04-01T01:30+02:00")
            .expect("minutes with offset");
        assert_eq!(day.key(), "2024-03-31");
    }

    #[test]
    fn offset_timestamps_are_read_as_utc_instants() {
        let day = utc_minus_five()
            .normalize_str("2024-04-01T01:30:00+02:00")
            .expect("offset");
        assert_eq!(day.key(), "2024-03-31");
    }

    #[test]
    fn zoneless_date_times_keep_the_written_day() {
        let normalizer = utc_plus_nine();
        assert_eq!(
            normalizer.normalize_str("2024-03-05T00:00:00").unwrap().key(),
            "2024-03-05"
        );
        assert_eq!(
            normalizer.normalize_str("2024-03-05 18:45").unwrap().key(),
            "2024-03-05"
        );
    }

    #[test]
    fn generic_instants_use_the_viewer_zone() {
        let raw = "Sun, 31 Mar 2024 23:00:00 +0000";
        assert_eq!(utc_minus_five().normalize_str(raw).unwrap().key(), "2024-03-31");
        assert_eq!(utc_plus_nine().normalize_str(raw).unwrap().key(), "2024-04-01");

        // 2024-03-05T03:00:00Z
        let millis = RawDate::Millis(1_709_607_600_000.0);
        assert_eq!(utc_minus_five().normalize(&millis).unwrap().key(), "2024-03-04");
        assert_eq!(utc_plus_nine().normalize(&millis).unwrap().key(), "2024-03-05");
    }

    #[test]
    fn invalid_inputs_become_the_sentinel() {
        let normalizer = DateNormalizer::utc();
        for input in ["", "yesterday", "2024-13-01", "2024-02-30", "2024-3-5", "05/03/2024"] {
            assert_eq!(normalizer.normalize_str(input), None, "{input}");
        }
        assert_eq!(normalizer.normalize(&RawDate::Millis(f64::NAN)), None);
        assert!(matches!(
            normalizer.try_normalize_str("nope"),
            Err(InputError::InvalidDateInput(_))
        ));
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = utc_minus_five();
        for input in ["2024-03-05", "2024-03-31T23:00:00Z", "2024-06-01 08:00"] {
            let once = normalizer.normalize_str(input).unwrap();
            let twice = normalizer.normalize(&RawDate::from(once)).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once.to_string(), twice.to_string());
        }
    }

    #[test]
    fn days_are_held_at_midday() {
        let day = LocalDay::from_ymd(2024, 3, 5).unwrap();
        assert_eq!(day.as_naive().format("%H:%M:%S").to_string(), "12:00:00");
        let zoned = day.in_zone(&FixedOffset::east_opt(14 * 3600).unwrap()).unwrap();
        assert_eq!(zoned.date_naive(), day.date());
    }

    #[test]
    fn serde_uses_the_day_key() {
        let day = LocalDay::from_ymd(2024, 6, 1).unwrap();
        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, "\"2024-06-01\"");
        let back: LocalDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day);
    }
}

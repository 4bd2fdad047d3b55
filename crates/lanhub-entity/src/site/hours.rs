//! Opening hours by day class.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// The three schedules a site publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
    /// Monday to Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl DayClass {
    /// Classify a weekday.
    pub fn of(day: Weekday) -> Self {
        match day {
            Weekday::Sun => Self::Sunday,
            Weekday::Sat => Self::Saturday,
            _ => Self::Weekday,
        }
    }
}

/// Opening and closing time for one day class, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    /// Opening time.
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    /// Closing time.
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
}

impl DayHours {
    /// Build from `(hour, minute)` pairs. Invalid values collapse to midnight.
    pub fn new(open: (u32, u32), close: (u32, u32)) -> Self {
        Self {
            open: NaiveTime::from_hms_opt(open.0, open.1, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(close.0, close.1, 0).unwrap_or_default(),
        }
    }

    /// Whether `time` falls within the opening window (minute precision).
    pub fn contains(&self, time: NaiveTime) -> bool {
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        time >= self.open && time <= self.close
    }
}

/// Weekly opening hours of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    /// Monday to Friday.
    pub weekday: DayHours,
    /// Saturday.
    pub saturday: DayHours,
    /// Sunday.
    pub sunday: DayHours,
}

impl OpeningHours {
    /// Hours for a given day class.
    pub fn for_class(&self, class: DayClass) -> DayHours {
        match class {
            DayClass::Weekday => self.weekday,
            DayClass::Saturday => self.saturday,
            DayClass::Sunday => self.sunday,
        }
    }

    /// Whether the site is open at the given local date-time.
    pub fn is_open_at(&self, local: NaiveDateTime) -> bool {
        self.for_class(DayClass::of(local.weekday()))
            .contains(local.time())
    }
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            weekday: DayHours::new((9, 0), (23, 0)),
            saturday: DayHours::new((9, 0), (23, 0)),
            sunday: DayHours::new((10, 0), (22, 0)),
        }
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 30))
            .expect("valid date")
    }

    #[test]
    fn test_day_classes() {
        let hours = OpeningHours::default();
        // 2026-10-18 is a Sunday, 2026-10-17 a Saturday, 2026-10-19 a Monday.
        assert!(!hours.is_open_at(at(2026, 10, 18, 9, 30)));
        assert!(hours.is_open_at(at(2026, 10, 18, 10, 0)));
        assert!(hours.is_open_at(at(2026, 10, 17, 9, 0)));
        assert!(hours.is_open_at(at(2026, 10, 19, 23, 0)));
        assert!(!hours.is_open_at(at(2026, 10, 19, 23, 1)));
    }

    #[test]
    fn test_hours_serialize_as_hhmm() {
        let json = serde_json::to_value(OpeningHours::default()).expect("serialize");
        assert_eq!(json["sunday"]["open"], "10:00");
        assert_eq!(json["weekday"]["close"], "23:00");

        let parsed: OpeningHours = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, OpeningHours::default());
    }
}

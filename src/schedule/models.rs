use crate::error::{validation_error, GarageResult};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Weekday in the Monday-first order used for display and editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in display order
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Day-of-week index in the wire format (0=Sunday..6=Saturday)
    pub fn api_index(self) -> u8 {
        (self as u8 + 1) % 7
    }

    /// Inverse of `api_index`; `None` for indices outside 0..=6
    pub fn from_api_index(index: u8) -> Option<Weekday> {
        if index > 6 {
            return None;
        }
        Some(Self::ALL[((index + 6) % 7) as usize])
    }

    /// Human-readable day name
    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

/// A break within one day's working hours, local to the edit buffer.
/// Never serialized; breaks cross the wire as restrictions.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakEntry {
    /// Client-generated identifier, used only for list editing
    pub id: Uuid,
    pub from_time: String,
    pub to_time: String,
    pub description: String,
}

impl BreakEntry {
    /// Create a break with the default description
    pub fn new(from_time: impl Into<String>, to_time: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_time: from_time.into(),
            to_time: to_time.into(),
            description: "Break".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One weekday's working hours in the edit buffer
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    pub day: Weekday,
    pub is_closed: bool,
    pub from_time: String,
    pub to_time: String,
    /// Slot granularity for the day, in minutes
    pub duration: u32,
    pub breaks: Vec<BreakEntry>,
}

impl DaySchedule {
    /// An open day with the given hours and slot duration
    pub fn open(day: Weekday, from_time: &str, to_time: &str, duration: u32) -> Self {
        Self {
            day,
            is_closed: false,
            from_time: from_time.to_string(),
            to_time: to_time.to_string(),
            duration,
            breaks: Vec::new(),
        }
    }
}

/// Kind of a weekly restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionKind {
    #[serde(rename = "BREAK")]
    Break,
    #[serde(rename = "HOLIDAY")]
    Holiday,
}

/// Accept `day_of_week` as either a single integer or an array of integers.
/// Older backend responses emit the scalar form; this client always writes
/// the array form.
fn scalar_or_array<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScalarOrArray {
        One(u8),
        Many(Vec<u8>),
    }

    Ok(match ScalarOrArray::deserialize(deserializer)? {
        ScalarOrArray::One(day) => vec![day],
        ScalarOrArray::Many(days) => days,
    })
}

/// A recurring weekly exclusion (BREAK = partial-day, HOLIDAY = full-day)
/// attached to one or more weekdays, in wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    #[serde(rename = "type")]
    pub kind: RestrictionKind,
    /// Wire day-of-week indices (0=Sunday..6=Saturday)
    #[serde(deserialize_with = "scalar_or_array")]
    pub day_of_week: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub description: String,
    pub is_recurring: bool,
}

impl Restriction {
    /// A weekly break over the given wire day indices
    pub fn weekly_break(
        days: Vec<u8>,
        start_time: &str,
        end_time: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: RestrictionKind::Break,
            day_of_week: days,
            start_time: Some(start_time.to_string()),
            end_time: Some(end_time.to_string()),
            description: description.into(),
            is_recurring: true,
        }
    }

    /// A weekly full-day holiday over the given wire day indices
    pub fn weekly_holiday(days: Vec<u8>, description: impl Into<String>) -> Self {
        Self {
            kind: RestrictionKind::Holiday,
            day_of_week: days,
            start_time: None,
            end_time: None,
            description: description.into(),
            is_recurring: true,
        }
    }
}

/// One bookable interval within a day's wire hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start_time: String,
    pub end_time: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One weekday's hours in wire form: either `{is_closed: true}` or
/// intervals plus a slot duration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intervals: Vec<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_duration: Option<u32>,
}

impl DayHours {
    pub fn closed() -> Self {
        Self {
            is_closed: true,
            ..Default::default()
        }
    }

    pub fn open(start_time: &str, end_time: &str, slot_duration: u32) -> Self {
        Self {
            is_closed: false,
            intervals: vec![Interval {
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
            }],
            slot_duration: Some(slot_duration),
        }
    }
}

/// The full weekly schedule document as fetched from and submitted to the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    /// Hours keyed by wire day index (0=Sunday..6=Saturday)
    #[serde(default)]
    pub daily_hours: BTreeMap<u8, DayHours>,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    /// Server-side modification stamp, echoed back on save when present so
    /// the backend can detect a concurrent editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A single-date recurring holiday (e.g. Christmas every December 25th)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub month: u32,
    pub day: u32,
    pub description: String,
    pub is_recurring: bool,
}

impl HolidayEntry {
    /// Create a holiday, checking month and day ranges
    pub fn new(month: u32, day: u32, description: impl Into<String>) -> GarageResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(validation_error("Holiday month must be between 1 and 12"));
        }
        if !(1..=31).contains(&day) {
            return Err(validation_error("Holiday day must be between 1 and 31"));
        }
        let description = description.into();
        if description.trim().is_empty() {
            return Err(validation_error("Holiday description must not be empty"));
        }
        Ok(Self {
            month,
            day,
            description,
            is_recurring: true,
        })
    }

    /// Project the holiday onto a concrete year for display. Never sent to
    /// the API; `None` when the month/day pair does not exist in that year.
    pub fn projected_date(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// Lifecycle state of a bookable slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Booked,
    Blocked,
}

/// Where a slot came from: generated from the weekly template, or an
/// explicit per-date override stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotSource {
    Template,
    Database,
}

/// A bookable time interval on a specific calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub source: SlotSource,
}

/// One day of the month/week calendar view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub is_closed: bool,
}

/// Month or week view with holiday markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub days: Vec<CalendarDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_api_index_is_sunday_based() {
        assert_eq!(Weekday::Monday.api_index(), 1);
        assert_eq!(Weekday::Saturday.api_index(), 6);
        assert_eq!(Weekday::Sunday.api_index(), 0);
    }

    #[test]
    fn weekday_api_index_roundtrips() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_api_index(day.api_index()), Some(day));
        }
        for index in 0..7u8 {
            assert_eq!(Weekday::from_api_index(index).unwrap().api_index(), index);
        }
        assert_eq!(Weekday::from_api_index(7), None);
    }

    #[test]
    fn restriction_day_of_week_accepts_scalar_and_array() {
        let scalar: Restriction = serde_json::from_str(
            r#"{"type": "HOLIDAY", "day_of_week": 0, "description": "Closed Sundays", "is_recurring": true}"#,
        )
        .unwrap();
        assert_eq!(scalar.day_of_week, vec![0]);

        let array: Restriction = serde_json::from_str(
            r#"{"type": "BREAK", "day_of_week": [1, 2], "start_time": "12:00", "end_time": "13:00", "description": "Lunch", "is_recurring": true}"#,
        )
        .unwrap();
        assert_eq!(array.day_of_week, vec![1, 2]);
    }

    #[test]
    fn restriction_serializes_day_of_week_as_array() {
        let restriction = Restriction::weekly_holiday(vec![0], "Closed Sundays");
        let json = serde_json::to_value(&restriction).unwrap();
        assert!(json["day_of_week"].is_array());
        assert_eq!(json["type"], "HOLIDAY");
        // Holiday carries no times at all
        assert!(json.get("start_time").is_none());
        assert!(json.get("end_time").is_none());
    }

    #[test]
    fn closed_day_hours_serialize_minimally() {
        let json = serde_json::to_value(DayHours::closed()).unwrap();
        assert_eq!(json, serde_json::json!({"is_closed": true}));

        let open = serde_json::to_value(DayHours::open("09:00", "17:00", 60)).unwrap();
        assert_eq!(
            open,
            serde_json::json!({
                "intervals": [{"start_time": "09:00", "end_time": "17:00"}],
                "slot_duration": 60
            })
        );
    }

    #[test]
    fn schedule_document_roundtrips_through_json() {
        let mut daily_hours = BTreeMap::new();
        daily_hours.insert(0, DayHours::closed());
        daily_hours.insert(1, DayHours::open("08:00", "18:00", 30));
        let doc = ScheduleDocument {
            daily_hours,
            restrictions: vec![Restriction::weekly_break(
                vec![1],
                "12:00",
                "12:30",
                "Lunch",
            )],
            updated_at: None,
        };

        let json = serde_json::to_string(&doc).unwrap();
        let back: ScheduleDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn holiday_entry_validates_ranges() {
        assert!(HolidayEntry::new(12, 25, "Christmas").is_ok());
        assert!(HolidayEntry::new(0, 25, "Bad month").is_err());
        assert!(HolidayEntry::new(13, 1, "Bad month").is_err());
        assert!(HolidayEntry::new(6, 32, "Bad day").is_err());
        assert!(HolidayEntry::new(6, 1, "   ").is_err());
    }

    #[test]
    fn holiday_projection_handles_impossible_dates() {
        let leap = HolidayEntry::new(2, 29, "Leap day").unwrap();
        assert!(leap.projected_date(2024).is_some());
        assert!(leap.projected_date(2025).is_none());
    }
}

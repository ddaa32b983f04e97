use super::models::{
    BreakEntry, DayHours, DaySchedule, Restriction, RestrictionKind, ScheduleDocument, Weekday,
};
use super::reconcile;
use crate::config::{Config, DEFAULT_CLOSE, DEFAULT_OPEN, DEFAULT_SLOT_DURATION};
use crate::error::GarageResult;
use std::collections::BTreeMap;

/// Map a Monday-first row index (0=Monday..6=Sunday) to the wire
/// day-of-week index (0=Sunday..6=Saturday)
pub fn to_api_day_index(component_index: usize) -> u8 {
    ((component_index + 1) % 7) as u8
}

/// Inverse of `to_api_day_index`
pub fn to_component_index(api_index: u8) -> usize {
    ((api_index + 6) % 7) as usize
}

/// Hours used for weekdays the backend has no stored data for
#[derive(Debug, Clone)]
pub struct DayDefaults {
    pub open: String,
    pub close: String,
    pub slot_duration: u32,
}

impl DayDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            open: config.default_open.clone(),
            close: config.default_close.clone(),
            slot_duration: config.default_slot_duration,
        }
    }
}

impl Default for DayDefaults {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
            slot_duration: DEFAULT_SLOT_DURATION,
        }
    }
}

/// The editable weekly plan: exactly seven days in Monday-first order,
/// plus the weekly full-day holidays
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan {
    /// Always seven entries, Monday first
    pub days: Vec<DaySchedule>,
    /// Weekly full-day holidays, kept sorted in display order
    pub holidays: Vec<Weekday>,
    /// Label carried by the merged holiday restriction on submission
    pub holiday_description: String,
    /// Server modification stamp from the last fetch, echoed on save
    pub updated_at: Option<String>,
}

impl WeekPlan {
    /// A fresh plan with every day open on the default hours
    pub fn with_defaults(defaults: &DayDefaults) -> Self {
        let days = Weekday::ALL
            .iter()
            .map(|&day| {
                DaySchedule::open(day, &defaults.open, &defaults.close, defaults.slot_duration)
            })
            .collect();
        Self {
            days,
            holidays: Vec::new(),
            holiday_description: "Holiday".to_string(),
            updated_at: None,
        }
    }

    /// Build the editable plan from a fetched schedule document.
    /// Days absent from the document get the default hours, open.
    pub fn from_wire(doc: &ScheduleDocument, defaults: &DayDefaults) -> Self {
        let mut plan = Self::with_defaults(defaults);
        plan.updated_at = doc.updated_at.clone();

        for (&api_index, hours) in &doc.daily_hours {
            if api_index > 6 {
                continue;
            }
            let row = &mut plan.days[to_component_index(api_index)];
            if hours.is_closed {
                row.is_closed = true;
                continue;
            }
            if let Some(interval) = hours.intervals.first() {
                row.from_time = interval.start_time.clone();
                row.to_time = interval.end_time.clone();
            }
            if let Some(duration) = hours.slot_duration {
                row.duration = duration;
            }
        }

        for restriction in &doc.restrictions {
            match restriction.kind {
                RestrictionKind::Holiday => {
                    if plan.holiday_description == "Holiday"
                        && !restriction.description.trim().is_empty()
                    {
                        plan.holiday_description = restriction.description.clone();
                    }
                    for &api_index in &restriction.day_of_week {
                        if let Some(day) = Weekday::from_api_index(api_index) {
                            if !plan.holidays.contains(&day) {
                                plan.holidays.push(day);
                            }
                        }
                    }
                }
                RestrictionKind::Break => {
                    let (start, end) = match (&restriction.start_time, &restriction.end_time) {
                        (Some(start), Some(end)) => (start, end),
                        // A break with no times cannot be edited; drop it
                        _ => continue,
                    };
                    for &api_index in &restriction.day_of_week {
                        if Weekday::from_api_index(api_index).is_some() {
                            plan.days[to_component_index(api_index)].breaks.push(
                                BreakEntry::new(start.clone(), end.clone())
                                    .with_description(restriction.description.clone()),
                            );
                        }
                    }
                }
            }
        }

        plan.holidays.sort();
        plan
    }

    /// Assemble and validate the wire document for submission
    pub fn to_wire(&self) -> GarageResult<ScheduleDocument> {
        let mut daily_hours = BTreeMap::new();
        for (component_index, day) in self.days.iter().enumerate() {
            let hours = if day.is_closed {
                DayHours::closed()
            } else {
                DayHours::open(&day.from_time, &day.to_time, day.duration)
            };
            daily_hours.insert(to_api_day_index(component_index), hours);
        }

        // Identical breaks across days collapse into one restriction
        // carrying the array of days
        let mut restrictions: Vec<Restriction> = Vec::new();
        for day in &self.days {
            if day.is_closed || self.holidays.contains(&day.day) {
                continue;
            }
            let api_index = day.day.api_index();
            for entry in &day.breaks {
                let existing = restrictions.iter_mut().find(|r| {
                    r.start_time.as_deref() == Some(entry.from_time.as_str())
                        && r.end_time.as_deref() == Some(entry.to_time.as_str())
                        && r.description == entry.description
                });
                match existing {
                    Some(restriction) => {
                        if !restriction.day_of_week.contains(&api_index) {
                            restriction.day_of_week.push(api_index);
                        }
                    }
                    None => restrictions.push(Restriction::weekly_break(
                        vec![api_index],
                        &entry.from_time,
                        &entry.to_time,
                        entry.description.clone(),
                    )),
                }
            }
        }
        for restriction in &mut restrictions {
            restriction.day_of_week.sort_unstable();
        }

        if !self.holidays.is_empty() {
            restrictions.push(Restriction::weekly_holiday(
                self.holidays.iter().map(|day| day.api_index()).collect(),
                self.holiday_description.clone(),
            ));
        }

        let doc = ScheduleDocument {
            daily_hours,
            restrictions: reconcile::merge_holidays(restrictions),
            updated_at: self.updated_at.clone(),
        };
        reconcile::validate_document(&doc)?;
        Ok(doc)
    }

    /// Access one day's schedule
    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day as usize]
    }

    /// Mutable access to one day's schedule
    pub fn day_mut(&mut self, day: Weekday) -> &mut DaySchedule {
        &mut self.days[day as usize]
    }

    /// Mark a day as a weekly holiday. Breaks on that day are removed;
    /// a holiday day cannot carry break restrictions.
    pub fn set_holiday(&mut self, day: Weekday) {
        if !self.holidays.contains(&day) {
            self.holidays.push(day);
            self.holidays.sort();
        }
        self.days[day as usize].breaks.clear();
    }

    /// Remove a day from the weekly holidays
    pub fn clear_holiday(&mut self, day: Weekday) {
        self.holidays.retain(|&d| d != day);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::models::Interval;

    #[test]
    fn day_index_mapping_is_a_bijection() {
        for component_index in 0..7 {
            assert_eq!(
                to_component_index(to_api_day_index(component_index)),
                component_index
            );
        }
        for api_index in 0..7u8 {
            assert_eq!(to_api_day_index(to_component_index(api_index)), api_index);
        }
        // Monday-first index 0 is wire day 1, Sunday (index 6) is wire day 0
        assert_eq!(to_api_day_index(0), 1);
        assert_eq!(to_api_day_index(6), 0);
    }

    #[test]
    fn absent_days_get_defaults() {
        let plan = WeekPlan::from_wire(&ScheduleDocument::default(), &DayDefaults::default());
        assert_eq!(plan.days.len(), 7);
        for day in &plan.days {
            assert!(!day.is_closed);
            assert_eq!(day.from_time, "09:00");
            assert_eq!(day.to_time, "17:00");
            assert_eq!(day.duration, 60);
            assert!(day.breaks.is_empty());
        }
    }

    #[test]
    fn wire_days_land_on_the_right_rows() {
        let mut doc = ScheduleDocument::default();
        // Wire day 0 is Sunday, wire day 3 is Wednesday
        doc.daily_hours.insert(0, DayHours::closed());
        doc.daily_hours.insert(3, DayHours::open("10:00", "14:00", 30));

        let plan = WeekPlan::from_wire(&doc, &DayDefaults::default());
        assert!(plan.day(Weekday::Sunday).is_closed);
        let wednesday = plan.day(Weekday::Wednesday);
        assert_eq!(wednesday.from_time, "10:00");
        assert_eq!(wednesday.to_time, "14:00");
        assert_eq!(wednesday.duration, 30);
    }

    #[test]
    fn breaks_and_holidays_come_back_from_restrictions() {
        let doc = ScheduleDocument {
            restrictions: vec![
                Restriction::weekly_break(vec![1, 2], "12:00", "13:00", "Lunch"),
                Restriction::weekly_holiday(vec![0], "Closed Sundays"),
            ],
            ..Default::default()
        };

        let plan = WeekPlan::from_wire(&doc, &DayDefaults::default());
        assert_eq!(plan.day(Weekday::Monday).breaks.len(), 1);
        assert_eq!(plan.day(Weekday::Monday).breaks[0].description, "Lunch");
        assert_eq!(plan.day(Weekday::Tuesday).breaks.len(), 1);
        assert!(plan.day(Weekday::Wednesday).breaks.is_empty());
        assert_eq!(plan.holidays, vec![Weekday::Sunday]);
        assert_eq!(plan.holiday_description, "Closed Sundays");
    }

    #[test]
    fn to_wire_emits_closed_and_open_shapes() {
        let mut plan = WeekPlan::with_defaults(&DayDefaults::default());
        plan.day_mut(Weekday::Sunday).is_closed = true;

        let doc = plan.to_wire().unwrap();
        assert_eq!(doc.daily_hours[&0], DayHours::closed());
        assert_eq!(
            doc.daily_hours[&1],
            DayHours {
                is_closed: false,
                intervals: vec![Interval {
                    start_time: "09:00".to_string(),
                    end_time: "17:00".to_string(),
                }],
                slot_duration: Some(60),
            }
        );
    }

    #[test]
    fn identical_breaks_group_into_one_restriction() {
        let mut plan = WeekPlan::with_defaults(&DayDefaults::default());
        plan.day_mut(Weekday::Monday)
            .breaks
            .push(BreakEntry::new("12:00", "13:00").with_description("Lunch"));
        plan.day_mut(Weekday::Friday)
            .breaks
            .push(BreakEntry::new("12:00", "13:00").with_description("Lunch"));
        plan.day_mut(Weekday::Tuesday)
            .breaks
            .push(BreakEntry::new("15:00", "15:30").with_description("Cleanup"));

        let doc = plan.to_wire().unwrap();
        let breaks: Vec<&Restriction> = doc
            .restrictions
            .iter()
            .filter(|r| r.kind == RestrictionKind::Break)
            .collect();
        assert_eq!(breaks.len(), 2);
        let lunch = breaks.iter().find(|r| r.description == "Lunch").unwrap();
        // Monday is wire day 1, Friday is wire day 5
        assert_eq!(lunch.day_of_week, vec![1, 5]);
    }

    #[test]
    fn holiday_day_sheds_its_breaks_on_the_wire() {
        let mut plan = WeekPlan::with_defaults(&DayDefaults::default());
        plan.day_mut(Weekday::Monday)
            .breaks
            .push(BreakEntry::new("12:00", "13:00"));
        plan.holidays = vec![Weekday::Monday];

        let doc = plan.to_wire().unwrap();
        assert!(doc
            .restrictions
            .iter()
            .all(|r| r.kind != RestrictionKind::Break));
        let holiday = doc
            .restrictions
            .iter()
            .find(|r| r.kind == RestrictionKind::Holiday)
            .unwrap();
        assert_eq!(holiday.day_of_week, vec![1]);
    }

    #[test]
    fn set_holiday_clears_day_breaks() {
        let mut plan = WeekPlan::with_defaults(&DayDefaults::default());
        plan.day_mut(Weekday::Thursday)
            .breaks
            .push(BreakEntry::new("12:00", "13:00"));

        plan.set_holiday(Weekday::Thursday);
        assert!(plan.day(Weekday::Thursday).breaks.is_empty());
        assert_eq!(plan.holidays, vec![Weekday::Thursday]);

        plan.clear_holiday(Weekday::Thursday);
        assert!(plan.holidays.is_empty());
    }

    #[test]
    fn wire_roundtrip_is_stable() {
        let mut plan = WeekPlan::with_defaults(&DayDefaults::default());
        plan.day_mut(Weekday::Saturday).is_closed = true;
        plan.day_mut(Weekday::Monday).from_time = "08:00".to_string();
        plan.day_mut(Weekday::Monday)
            .breaks
            .push(BreakEntry::new("12:00", "13:00"));
        plan.set_holiday(Weekday::Sunday);

        let doc = plan.to_wire().unwrap();
        let reloaded = WeekPlan::from_wire(&doc, &DayDefaults::default());
        let doc_again = reloaded.to_wire().unwrap();
        assert_eq!(doc, doc_again);
    }
}

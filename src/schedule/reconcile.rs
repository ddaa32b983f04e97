use super::models::{Restriction, RestrictionKind, ScheduleDocument, Weekday};
use super::time::{is_ordered, parse_time};
use crate::error::{validation_error, GarageResult};
use std::collections::BTreeSet;

/// Remove a day from every break restriction, dropping any break left
/// with no days
pub fn strip_break_day(restrictions: &mut Vec<Restriction>, day: u8) {
    for restriction in restrictions.iter_mut() {
        if restriction.kind == RestrictionKind::Break {
            restriction.day_of_week.retain(|&d| d != day);
        }
    }
    restrictions.retain(|r| r.kind != RestrictionKind::Break || !r.day_of_week.is_empty());
}

/// Toggle a day into holiday. Breaks lose the day (a holiday day cannot
/// carry break restrictions) and all holidays collapse into one restriction.
pub fn set_holiday(restrictions: Vec<Restriction>, day: u8, description: &str) -> Vec<Restriction> {
    let mut restrictions = restrictions;
    strip_break_day(&mut restrictions, day);

    match restrictions
        .iter_mut()
        .find(|r| r.kind == RestrictionKind::Holiday)
    {
        Some(holiday) => {
            if !holiday.day_of_week.contains(&day) {
                holiday.day_of_week.push(day);
            }
        }
        None => restrictions.push(Restriction::weekly_holiday(vec![day], description)),
    }

    merge_holidays(restrictions)
}

/// Remove a day from every holiday restriction, dropping emptied ones
pub fn clear_holiday(restrictions: Vec<Restriction>, day: u8) -> Vec<Restriction> {
    let mut restrictions = restrictions;
    for restriction in restrictions.iter_mut() {
        if restriction.kind == RestrictionKind::Holiday {
            restriction.day_of_week.retain(|&d| d != day);
        }
    }
    restrictions.retain(|r| r.kind != RestrictionKind::Holiday || !r.day_of_week.is_empty());
    restrictions
}

/// Collapse all holiday restrictions into a single one carrying the
/// de-duplicated, ascending union of their days, and enforce the
/// holiday/break exclusion on the result
pub fn merge_holidays(restrictions: Vec<Restriction>) -> Vec<Restriction> {
    let mut merged = Vec::new();
    let mut days = BTreeSet::new();
    let mut description: Option<String> = None;

    for restriction in restrictions {
        if restriction.kind == RestrictionKind::Holiday {
            if description.is_none() && !restriction.description.trim().is_empty() {
                description = Some(restriction.description.clone());
            }
            days.extend(restriction.day_of_week.iter().copied());
        } else {
            merged.push(restriction);
        }
    }

    if !days.is_empty() {
        for &day in &days {
            strip_break_day(&mut merged, day);
        }
        merged.push(Restriction::weekly_holiday(
            days.into_iter().collect(),
            description.unwrap_or_else(|| "Holiday".to_string()),
        ));
    }

    merged
}

/// Days claimed by both a holiday and a break restriction. Empty after
/// reconciliation.
pub fn conflicting_days(restrictions: &[Restriction]) -> Vec<u8> {
    let holiday_days: BTreeSet<u8> = restrictions
        .iter()
        .filter(|r| r.kind == RestrictionKind::Holiday)
        .flat_map(|r| r.day_of_week.iter().copied())
        .collect();
    let break_days: BTreeSet<u8> = restrictions
        .iter()
        .filter(|r| r.kind == RestrictionKind::Break)
        .flat_map(|r| r.day_of_week.iter().copied())
        .collect();
    holiday_days.intersection(&break_days).copied().collect()
}

fn day_names(days: &[u8]) -> String {
    let labels: Vec<&str> = days
        .iter()
        .map(|&d| Weekday::from_api_index(d).map(|w| w.label()).unwrap_or("?"))
        .collect();
    labels.join(", ")
}

/// Collect every violation that must block submission. Each message names
/// the offending field and day.
pub fn document_violations(doc: &ScheduleDocument) -> Vec<String> {
    let mut violations = Vec::new();

    for (&api_index, hours) in &doc.daily_hours {
        let day = match Weekday::from_api_index(api_index) {
            Some(day) => day,
            None => {
                violations.push(format!("Day index {} is out of range", api_index));
                continue;
            }
        };
        if hours.is_closed {
            continue;
        }
        if hours.intervals.is_empty() {
            violations.push(format!("{}: an open day needs working hours", day.label()));
        }
        for interval in &hours.intervals {
            if parse_time(&interval.start_time).is_none() {
                violations.push(format!(
                    "{}: opening time '{}' is not a valid HH:MM time",
                    day.label(),
                    interval.start_time
                ));
            } else if parse_time(&interval.end_time).is_none() {
                violations.push(format!(
                    "{}: closing time '{}' is not a valid HH:MM time",
                    day.label(),
                    interval.end_time
                ));
            } else if !is_ordered(&interval.start_time, &interval.end_time) {
                violations.push(format!(
                    "{}: opening time must be before closing time",
                    day.label()
                ));
            }
        }
        match hours.slot_duration {
            Some(duration) if !(15..=480).contains(&duration) => violations.push(format!(
                "{}: slot duration must be between 15 and 480 minutes",
                day.label()
            )),
            None => violations.push(format!(
                "{}: slot duration is required for an open day",
                day.label()
            )),
            _ => {}
        }
    }

    for restriction in &doc.restrictions {
        let days = day_names(&restriction.day_of_week);
        for &day in &restriction.day_of_week {
            if day > 6 {
                violations.push(format!(
                    "Restriction day index {} is out of range",
                    day
                ));
            }
        }
        if restriction.description.trim().is_empty() {
            violations.push(format!("Restriction on {} must have a description", days));
        }
        if restriction.kind == RestrictionKind::Break {
            match (&restriction.start_time, &restriction.end_time) {
                (Some(start), Some(end)) => {
                    if !is_ordered(start, end) {
                        violations.push(format!(
                            "Break on {}: start time must be before end time",
                            days
                        ));
                    }
                }
                _ => violations.push(format!(
                    "Break on {} must have both start and end times",
                    days
                )),
            }
        }
    }

    let conflicts = conflicting_days(&doc.restrictions);
    if !conflicts.is_empty() {
        violations.push(format!(
            "{} cannot be a holiday and carry breaks at the same time",
            day_names(&conflicts)
        ));
    }

    violations
}

/// Validate a document before submission; any violation blocks the save
pub fn validate_document(doc: &ScheduleDocument) -> GarageResult<()> {
    let violations = document_violations(doc);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(validation_error(violations.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::models::DayHours;

    fn lunch_break(days: Vec<u8>) -> Restriction {
        Restriction::weekly_break(days, "12:00", "13:00", "Lunch")
    }

    #[test]
    fn holiday_strips_day_from_breaks() {
        let restrictions = vec![lunch_break(vec![1, 2, 3])];
        let reconciled = set_holiday(restrictions, 2, "Holiday");

        let lunch = reconciled
            .iter()
            .find(|r| r.kind == RestrictionKind::Break)
            .unwrap();
        assert_eq!(lunch.day_of_week, vec![1, 3]);
        let holiday = reconciled
            .iter()
            .find(|r| r.kind == RestrictionKind::Holiday)
            .unwrap();
        assert_eq!(holiday.day_of_week, vec![2]);
    }

    #[test]
    fn break_emptied_by_holiday_is_dropped() {
        let restrictions = vec![lunch_break(vec![4])];
        let reconciled = set_holiday(restrictions, 4, "Holiday");

        assert!(reconciled.iter().all(|r| r.kind != RestrictionKind::Break));
    }

    #[test]
    fn holidays_merge_into_sorted_union() {
        let restrictions = vec![
            Restriction::weekly_holiday(vec![5], "Holiday"),
            Restriction::weekly_holiday(vec![0, 5], "Holiday"),
            Restriction::weekly_holiday(vec![2], "Holiday"),
        ];
        let merged = merge_holidays(restrictions);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].day_of_week, vec![0, 2, 5]);
    }

    #[test]
    fn reconciled_sets_have_no_conflicting_days() {
        let restrictions = vec![lunch_break(vec![0, 1, 2]), lunch_break(vec![2, 3])];
        let reconciled = set_holiday(set_holiday(restrictions, 2, "Holiday"), 0, "Holiday");

        assert!(conflicting_days(&reconciled).is_empty());
    }

    #[test]
    fn clear_holiday_drops_emptied_restriction() {
        let restrictions = vec![Restriction::weekly_holiday(vec![3], "Holiday")];
        let cleared = clear_holiday(restrictions, 3);
        assert!(cleared.is_empty());
    }

    #[test]
    fn validation_names_the_offending_day() {
        let mut doc = ScheduleDocument::default();
        // Wire day 2 is Tuesday
        doc.daily_hours.insert(2, DayHours::open("17:00", "09:00", 60));

        let violations = document_violations(&doc);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("Tuesday"));
        assert!(violations[0].contains("before"));
    }

    #[test]
    fn validation_rejects_bad_slot_duration() {
        let mut doc = ScheduleDocument::default();
        doc.daily_hours.insert(1, DayHours::open("09:00", "17:00", 10));

        let violations = document_violations(&doc);
        assert!(violations
            .iter()
            .any(|v| v.contains("Monday") && v.contains("slot duration")));
    }

    #[test]
    fn validation_rejects_empty_description() {
        let doc = ScheduleDocument {
            restrictions: vec![Restriction::weekly_break(vec![1], "12:00", "13:00", "  ")],
            ..Default::default()
        };

        let violations = document_violations(&doc);
        assert!(violations.iter().any(|v| v.contains("description")));
    }

    #[test]
    fn validation_rejects_inverted_break() {
        let doc = ScheduleDocument {
            restrictions: vec![Restriction::weekly_break(vec![5], "14:00", "13:00", "Nap")],
            ..Default::default()
        };

        assert!(validate_document(&doc).is_err());
    }

    #[test]
    fn validation_flags_holiday_break_overlap() {
        let doc = ScheduleDocument {
            restrictions: vec![
                lunch_break(vec![1]),
                Restriction::weekly_holiday(vec![1], "Holiday"),
            ],
            ..Default::default()
        };

        let violations = document_violations(&doc);
        assert!(violations.iter().any(|v| v.contains("Monday")));
    }

    #[test]
    fn closed_days_skip_hours_validation() {
        let mut doc = ScheduleDocument::default();
        doc.daily_hours.insert(0, DayHours::closed());
        assert!(validate_document(&doc).is_ok());
    }
}

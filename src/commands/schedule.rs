use super::parse_weekday;
use garagehours::api::ScheduleHandle;
use garagehours::error::GarageResult;
use garagehours::schedule::{BreakEntry, ScheduleDraft, WeekPlan};
use tracing::info;

/// Print the weekly plan
pub async fn show(handle: &ScheduleHandle) -> GarageResult<()> {
    let plan = handle.get_plan().await?;
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &WeekPlan) {
    for day in &plan.days {
        if plan.holidays.contains(&day.day) {
            println!("{:<10} holiday ({})", day.day.label(), plan.holiday_description);
            continue;
        }
        if day.is_closed {
            println!("{:<10} closed", day.day.label());
            continue;
        }
        print!(
            "{:<10} {} - {}  ({} min slots)",
            day.day.label(),
            day.from_time,
            day.to_time,
            day.duration
        );
        for entry in &day.breaks {
            print!("  [{} {} - {}]", entry.description, entry.from_time, entry.to_time);
        }
        println!();
    }
}

/// Edit the plan through the draft and save only when something changed
async fn edit_and_save<F>(handle: &ScheduleHandle, edit: F) -> GarageResult<()>
where
    F: FnOnce(&mut WeekPlan),
{
    let plan = handle.get_plan().await?;
    let mut draft = ScheduleDraft::new(plan);
    edit(draft.current_mut());

    if !draft.has_changes() {
        println!("No changes to save.");
        return Ok(());
    }

    let saved = handle.save_plan(draft.current().clone(), false).await?;
    info!("Schedule saved");
    print_plan(&saved);
    Ok(())
}

/// Set one day's hours and slot duration
pub async fn set_day(
    handle: &ScheduleHandle,
    day: &str,
    from: &str,
    to: &str,
    duration: u32,
) -> GarageResult<()> {
    let day = parse_weekday(day)?;
    edit_and_save(handle, |plan| {
        let row = plan.day_mut(day);
        row.is_closed = false;
        row.from_time = from.to_string();
        row.to_time = to.to_string();
        row.duration = duration;
    })
    .await
}

/// Mark one day closed
pub async fn close_day(handle: &ScheduleHandle, day: &str) -> GarageResult<()> {
    let day = parse_weekday(day)?;
    edit_and_save(handle, |plan| {
        plan.day_mut(day).is_closed = true;
    })
    .await
}

/// Add a break to one day
pub async fn add_break(
    handle: &ScheduleHandle,
    day: &str,
    from: &str,
    to: &str,
    description: &str,
) -> GarageResult<()> {
    let day = parse_weekday(day)?;
    edit_and_save(handle, |plan| {
        plan.day_mut(day)
            .breaks
            .push(BreakEntry::new(from, to).with_description(description));
    })
    .await
}

/// Mark one day as a weekly holiday
pub async fn set_holiday(handle: &ScheduleHandle, day: &str) -> GarageResult<()> {
    let day = parse_weekday(day)?;
    edit_and_save(handle, |plan| plan.set_holiday(day)).await
}

/// Remove one day from the weekly holidays
pub async fn clear_holiday(handle: &ScheduleHandle, day: &str) -> GarageResult<()> {
    let day = parse_weekday(day)?;
    edit_and_save(handle, |plan| plan.clear_holiday(day)).await
}

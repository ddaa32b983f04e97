use chrono::{Datelike, Local};
use garagehours::api::ScheduleHandle;
use garagehours::error::GarageResult;
use garagehours::schedule::HolidayEntry;

fn print_holidays(holidays: &[HolidayEntry]) {
    if holidays.is_empty() {
        println!("No holidays configured.");
        return;
    }
    let year = Local::now().year();
    for holiday in holidays {
        // Current-year projection is display-only
        match holiday.projected_date(year) {
            Some(date) => println!("{}  {}", date, holiday.description),
            None => println!(
                "--{:02}-{:02}  {} (no such date in {})",
                holiday.month, holiday.day, holiday.description, year
            ),
        }
    }
}

/// List the recurring holidays
pub async fn list(handle: &ScheduleHandle) -> GarageResult<()> {
    let holidays = handle.list_holidays().await?;
    print_holidays(&holidays);
    Ok(())
}

/// Add a holiday and show the resulting list
pub async fn add(
    handle: &ScheduleHandle,
    month: u32,
    day: u32,
    description: &str,
) -> GarageResult<()> {
    let holiday = HolidayEntry::new(month, day, description)?;
    let holidays = handle.add_holiday(holiday).await?;
    print_holidays(&holidays);
    Ok(())
}

/// Remove a holiday by month and day and show the resulting list
pub async fn remove(handle: &ScheduleHandle, month: u32, day: u32) -> GarageResult<()> {
    let holidays = handle.delete_holiday(month, day).await?;
    print_holidays(&holidays);
    Ok(())
}

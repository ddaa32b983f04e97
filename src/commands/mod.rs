mod holidays;
mod schedule;
mod slots;

use clap::{Parser, Subcommand};
use garagehours::api::ScheduleHandle;
use garagehours::config::Config;
use garagehours::error::{validation_error, GarageResult};
use garagehours::schedule::Weekday;
use tokio_util::sync::CancellationToken;

/// Manage a garage's MOT-booking availability schedule
#[derive(Parser)]
#[command(name = "garagehours", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the weekly schedule, breaks, and holidays
    Show,
    /// Set one day's working hours and slot duration
    SetDay {
        /// Day name, e.g. monday
        day: String,
        /// Opening time (HH:MM)
        from: String,
        /// Closing time (HH:MM)
        to: String,
        /// Slot duration in minutes
        #[arg(default_value_t = 60)]
        duration: u32,
    },
    /// Mark one day as closed
    CloseDay { day: String },
    /// Add a break to one day
    AddBreak {
        day: String,
        /// Break start (HH:MM)
        from: String,
        /// Break end (HH:MM)
        to: String,
        /// Label shown in the schedule
        #[arg(default_value = "Break")]
        description: String,
    },
    /// Mark one day as a weekly holiday (drops its breaks)
    SetHoliday { day: String },
    /// Remove one day from the weekly holidays
    ClearHoliday { day: String },
    /// Show the calendar view for a month or week
    Calendar {
        year: i32,
        month: u32,
        /// Restrict to one week of the month
        #[arg(long)]
        week: Option<u32>,
    },
    /// List slots on a date (YYYY-MM-DD)
    Slots { date: String },
    /// Move one slot to a new time range
    ModifySlot {
        /// Slot date (YYYY-MM-DD)
        date: String,
        /// The slot's current start time (HH:MM)
        current_start: String,
        /// The slot's current end time (HH:MM)
        current_end: String,
        /// New start time (HH:MM)
        new_start: String,
        /// New end time (HH:MM)
        new_end: String,
        #[arg(long)]
        reason: Option<String>,
        /// Force the change through an overlap warning
        #[arg(long)]
        accept_overlap: bool,
    },
    /// Delete one manual slot by id
    DeleteSlot { id: String },
    /// Delete every manual slot on a date
    ClearManual { date: String },
    /// Block all slots in a date and time range
    Block {
        start_date: String,
        end_date: String,
        start_time: String,
        end_time: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Unblock all slots in a date and time range
    Unblock {
        start_date: String,
        end_date: String,
        start_time: String,
        end_time: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Manage the recurring single-date holidays
    #[command(subcommand)]
    Holiday(HolidayCommand),
    /// Wait until the slot starting at a time on a date becomes available
    Watch {
        /// Slot date (YYYY-MM-DD)
        date: String,
        /// Slot start time (HH:MM)
        time: String,
    },
}

#[derive(Subcommand)]
pub enum HolidayCommand {
    /// List holidays
    List,
    /// Add a holiday
    Add {
        month: u32,
        day: u32,
        description: String,
    },
    /// Remove a holiday by month and day
    Remove { month: u32, day: u32 },
}

/// Parse a day name the way it is typed on the command line
pub fn parse_weekday(input: &str) -> GarageResult<Weekday> {
    let lowered = input.to_lowercase();
    Weekday::ALL
        .iter()
        .copied()
        .find(|day| day.label().to_lowercase() == lowered)
        .ok_or_else(|| validation_error(format!("'{}' is not a day name", input)))
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(input: &str) -> GarageResult<chrono::NaiveDate> {
    input
        .parse()
        .map_err(|_| validation_error(format!("'{}' is not a YYYY-MM-DD date", input)))
}

/// Dispatch the parsed command against a fresh schedule handle
pub async fn run(cli: Cli, config: Config, token: CancellationToken) -> miette::Result<()> {
    let handle = ScheduleHandle::new(&config)?;

    let result = match cli.command {
        Command::Show => schedule::show(&handle).await,
        Command::SetDay {
            day,
            from,
            to,
            duration,
        } => schedule::set_day(&handle, &day, &from, &to, duration).await,
        Command::CloseDay { day } => schedule::close_day(&handle, &day).await,
        Command::AddBreak {
            day,
            from,
            to,
            description,
        } => schedule::add_break(&handle, &day, &from, &to, &description).await,
        Command::SetHoliday { day } => schedule::set_holiday(&handle, &day).await,
        Command::ClearHoliday { day } => schedule::clear_holiday(&handle, &day).await,
        Command::Calendar { year, month, week } => {
            slots::calendar(&handle, year, month, week).await
        }
        Command::Slots { date } => slots::list(&handle, &date).await,
        Command::ModifySlot {
            date,
            current_start,
            current_end,
            new_start,
            new_end,
            reason,
            accept_overlap,
        } => {
            slots::modify(
                &handle,
                &date,
                &current_start,
                &current_end,
                &new_start,
                &new_end,
                reason,
                accept_overlap,
            )
            .await
        }
        Command::DeleteSlot { id } => slots::delete(&handle, &id).await,
        Command::ClearManual { date } => slots::clear_manual(&handle, &date).await,
        Command::Block {
            start_date,
            end_date,
            start_time,
            end_time,
            reason,
        } => {
            slots::bulk(
                &handle,
                &start_date,
                &end_date,
                &start_time,
                &end_time,
                garagehours::schedule::BulkAction::Block,
                reason,
            )
            .await
        }
        Command::Unblock {
            start_date,
            end_date,
            start_time,
            end_time,
            reason,
        } => {
            slots::bulk(
                &handle,
                &start_date,
                &end_date,
                &start_time,
                &end_time,
                garagehours::schedule::BulkAction::Unblock,
                reason,
            )
            .await
        }
        Command::Holiday(cmd) => match cmd {
            HolidayCommand::List => holidays::list(&handle).await,
            HolidayCommand::Add {
                month,
                day,
                description,
            } => holidays::add(&handle, month, day, &description).await,
            HolidayCommand::Remove { month, day } => holidays::remove(&handle, month, day).await,
        },
        Command::Watch { date, time } => slots::watch(&handle, &config, &token, &date, &time).await,
    };

    // The actor outlives the command only to drain its mailbox
    let _ = handle.shutdown().await;

    result?;
    Ok(())
}

use super::parse_date;
use garagehours::api::{PollOptions, PollOutcome, PollTask, ScheduleHandle};
use garagehours::config::Config;
use garagehours::error::GarageResult;
use garagehours::schedule::{
    BulkAction, BulkSlotRequest, SlotModifyFlow, SlotModifyRequest, SlotStatus,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Print the calendar view for a month, optionally narrowed to one week
pub async fn calendar(
    handle: &ScheduleHandle,
    year: i32,
    month: u32,
    week: Option<u32>,
) -> GarageResult<()> {
    let view = handle.calendar_view(year, month, week).await?;
    println!("{}-{:02}", view.year, view.month);
    for day in &view.days {
        let marker = if day.is_holiday {
            " holiday"
        } else if day.is_closed {
            " closed"
        } else {
            ""
        };
        println!("  {}{}", day.date, marker);
    }
    Ok(())
}

/// List slots on one date
pub async fn list(handle: &ScheduleHandle, date: &str) -> GarageResult<()> {
    let date = parse_date(date)?;
    let slots = handle.slots_for_date(date).await?;
    if slots.is_empty() {
        println!("No slots on {}.", date);
        return Ok(());
    }
    for slot in &slots {
        println!(
            "{} - {}  {:?} ({:?})  id={}",
            slot.start_time, slot.end_time, slot.status, slot.source, slot.id
        );
    }
    Ok(())
}

/// Move one slot to a new time range, walking the two-phase overlap
/// confirmation when the backend asks for it
#[allow(clippy::too_many_arguments)]
pub async fn modify(
    handle: &ScheduleHandle,
    date: &str,
    current_start: &str,
    current_end: &str,
    new_start: &str,
    new_end: &str,
    reason: Option<String>,
    accept_overlap: bool,
) -> GarageResult<()> {
    let date = parse_date(date)?;
    let request =
        SlotModifyRequest::new(date, current_start, current_end, new_start, new_end, reason)?;
    let mut flow = SlotModifyFlow::new(request);

    let first = flow.start_submission()?;
    match handle.modify_slot(first).await {
        Ok(outcome) => flow.record_outcome(outcome),
        Err(e) => {
            flow.record_error();
            return Err(e);
        }
    }

    if let Some(warning) = flow.pending_warning().cloned() {
        println!("{}", warning.message);
        for slot in &warning.affected_slots {
            println!("  affects {} - {} (id={})", slot.start_time, slot.end_time, slot.id);
        }

        if !accept_overlap {
            flow.abandon();
            println!("Not applied. Re-run with --accept-overlap to force the change.");
            return Ok(());
        }

        flow.confirm_overlap()?;
        let second = flow.start_submission()?;
        match handle.modify_slot(second).await {
            Ok(outcome) => flow.record_outcome(outcome),
            Err(e) => {
                flow.record_error();
                return Err(e);
            }
        }
    }

    if flow.is_completed() {
        println!("Slot moved to {} - {}.", new_start, new_end);
    }
    Ok(())
}

/// Delete one manual slot
pub async fn delete(handle: &ScheduleHandle, id: &str) -> GarageResult<()> {
    handle.delete_slot(id).await?;
    println!("Slot {} deleted.", id);
    Ok(())
}

/// Delete every manual slot on a date
pub async fn clear_manual(handle: &ScheduleHandle, date: &str) -> GarageResult<()> {
    let date = parse_date(date)?;
    handle.delete_manual_slots(date).await?;
    println!("Manual slots on {} deleted.", date);
    Ok(())
}

/// Block or unblock every slot in a date and time range
pub async fn bulk(
    handle: &ScheduleHandle,
    start_date: &str,
    end_date: &str,
    start_time: &str,
    end_time: &str,
    action: BulkAction,
    reason: Option<String>,
) -> GarageResult<()> {
    let request = BulkSlotRequest::new(
        parse_date(start_date)?,
        parse_date(end_date)?,
        start_time,
        end_time,
        action,
        reason,
    )?;
    handle.bulk_modify(request).await?;
    println!(
        "{} slots from {} to {}, {} - {}.",
        match action {
            BulkAction::Block => "Blocked",
            BulkAction::Unblock => "Unblocked",
        },
        start_date,
        end_date,
        start_time,
        end_time
    );
    Ok(())
}

/// Poll until the slot starting at `time` on `date` becomes available,
/// the attempt budget runs out, or the process is interrupted
pub async fn watch(
    handle: &ScheduleHandle,
    config: &Config,
    token: &CancellationToken,
    date: &str,
    time: &str,
) -> GarageResult<()> {
    let date = parse_date(date)?;
    let time = time.to_string();
    let options = PollOptions::from_config(config);
    info!(
        "Watching {} {} for up to {} attempts",
        date, time, options.max_attempts
    );

    let poll_handle = handle.clone();
    let task = PollTask::spawn(options, token, move |_| {
        let handle = poll_handle.clone();
        let time = time.clone();
        async move {
            let slots = handle.slots_for_date(date).await?;
            Ok(slots
                .into_iter()
                .find(|slot| slot.start_time == time && slot.status == SlotStatus::Available))
        }
    });

    match task.join().await? {
        PollOutcome::Ready(slot) => {
            println!(
                "Slot {} - {} is available (id={}).",
                slot.start_time, slot.end_time, slot.id
            );
        }
        PollOutcome::Exhausted => println!("Slot did not become available in time."),
        PollOutcome::Cancelled => println!("Watch cancelled."),
    }
    Ok(())
}

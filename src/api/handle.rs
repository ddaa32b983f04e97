use super::actor::{ScheduleActor, ScheduleActorHandle};
use super::backend::ScheduleBackend;
use super::client::HttpBackend;
use crate::config::Config;
use crate::error::GarageResult;
use crate::schedule::{
    BulkSlotRequest, CalendarView, DayDefaults, HolidayEntry, ModifyOutcome, Slot,
    SlotModifyRequest, WeekPlan,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the schedule actor
#[derive(Clone)]
pub struct ScheduleHandle {
    actor_handle: ScheduleActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl ScheduleHandle {
    /// Create a handle backed by the HTTP client and spawn the actor
    pub fn new(config: &Config) -> GarageResult<Self> {
        let backend = Arc::new(HttpBackend::new(config)?);
        Ok(Self::with_backend(backend, DayDefaults::from_config(config)))
    }

    /// Create a handle over any backend (mocks in tests)
    pub fn with_backend(backend: Arc<dyn ScheduleBackend>, defaults: DayDefaults) -> Self {
        let (mut actor, handle) = ScheduleActor::new(backend, defaults);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Fetch the weekly plan, fresh from the backend
    pub async fn get_plan(&self) -> GarageResult<WeekPlan> {
        self.actor_handle.get_plan().await
    }

    /// Submit the plan; returns the state the backend holds after saving
    pub async fn save_plan(&self, plan: WeekPlan, replace: bool) -> GarageResult<WeekPlan> {
        self.actor_handle.save_plan(plan, replace).await
    }

    /// Month or week calendar view with holiday markers
    pub async fn calendar_view(
        &self,
        year: i32,
        month: u32,
        week_number: Option<u32>,
    ) -> GarageResult<CalendarView> {
        self.actor_handle
            .calendar_view(year, month, week_number)
            .await
    }

    /// Slots on one date, with status and source
    pub async fn slots_for_date(&self, date: NaiveDate) -> GarageResult<Vec<Slot>> {
        self.actor_handle.slots_for_date(date).await
    }

    /// Change one slot's times; may return an overlap warning
    pub async fn modify_slot(&self, request: SlotModifyRequest) -> GarageResult<ModifyOutcome> {
        self.actor_handle.modify_slot(request).await
    }

    /// Delete one manual slot
    pub async fn delete_slot(&self, slot_id: impl Into<String>) -> GarageResult<()> {
        self.actor_handle.delete_slot(slot_id.into()).await
    }

    /// Delete every manual slot on a date
    pub async fn delete_manual_slots(&self, date: NaiveDate) -> GarageResult<()> {
        self.actor_handle.delete_manual_slots(date).await
    }

    /// Block or unblock all slots in a range
    pub async fn bulk_modify(&self, request: BulkSlotRequest) -> GarageResult<()> {
        self.actor_handle.bulk_modify(request).await
    }

    /// Add a holiday; returns the refreshed list
    pub async fn add_holiday(&self, holiday: HolidayEntry) -> GarageResult<Vec<HolidayEntry>> {
        self.actor_handle.add_holiday(holiday).await
    }

    /// List the recurring holidays
    pub async fn list_holidays(&self) -> GarageResult<Vec<HolidayEntry>> {
        self.actor_handle.list_holidays().await
    }

    /// Delete a holiday by month and day; returns the refreshed list
    pub async fn delete_holiday(&self, month: u32, day: u32) -> GarageResult<Vec<HolidayEntry>> {
        self.actor_handle.delete_holiday(month, day).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> GarageResult<()> {
        self.actor_handle.shutdown().await
    }
}

use super::backend::ScheduleBackend;
use crate::error::{other_error, GarageResult};
use crate::schedule::{
    BulkSlotRequest, CalendarView, DayDefaults, HolidayEntry, ModifyOutcome, ScheduleDocument,
    Slot, SlotModifyRequest, WeekPlan,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The schedule actor: sole owner of the current schedule document.
/// Mutations go through it, and every successful mutation is followed by a
/// refetch so the cached document always reflects what the backend holds.
pub struct ScheduleActor {
    backend: Arc<dyn ScheduleBackend>,
    defaults: DayDefaults,
    document: Option<ScheduleDocument>,
    command_rx: mpsc::Receiver<ScheduleCommand>,
}

/// Commands that can be sent to the schedule actor
pub enum ScheduleCommand {
    GetPlan(mpsc::Sender<GarageResult<WeekPlan>>),
    SavePlan {
        plan: WeekPlan,
        replace: bool,
        respond_to: mpsc::Sender<GarageResult<WeekPlan>>,
    },
    CalendarView {
        year: i32,
        month: u32,
        week_number: Option<u32>,
        respond_to: mpsc::Sender<GarageResult<CalendarView>>,
    },
    SlotsForDate(NaiveDate, mpsc::Sender<GarageResult<Vec<Slot>>>),
    ModifySlot(SlotModifyRequest, mpsc::Sender<GarageResult<ModifyOutcome>>),
    DeleteSlot(String, mpsc::Sender<GarageResult<()>>),
    DeleteManualSlots(NaiveDate, mpsc::Sender<GarageResult<()>>),
    BulkModify(BulkSlotRequest, mpsc::Sender<GarageResult<()>>),
    AddHoliday(HolidayEntry, mpsc::Sender<GarageResult<Vec<HolidayEntry>>>),
    ListHolidays(mpsc::Sender<GarageResult<Vec<HolidayEntry>>>),
    DeleteHoliday {
        month: u32,
        day: u32,
        respond_to: mpsc::Sender<GarageResult<Vec<HolidayEntry>>>,
    },
    Shutdown,
}

/// Handle for communicating with the schedule actor
#[derive(Clone)]
pub struct ScheduleActorHandle {
    command_tx: mpsc::Sender<ScheduleCommand>,
}

impl ScheduleActorHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<GarageResult<T>>) -> ScheduleCommand,
    ) -> GarageResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| other_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| other_error("Response channel closed"))?
    }

    /// Fetch the current plan, fresh from the backend
    pub async fn get_plan(&self) -> GarageResult<WeekPlan> {
        self.request(ScheduleCommand::GetPlan).await
    }

    /// Submit a plan and get back the refetched state
    pub async fn save_plan(&self, plan: WeekPlan, replace: bool) -> GarageResult<WeekPlan> {
        self.request(|respond_to| ScheduleCommand::SavePlan {
            plan,
            replace,
            respond_to,
        })
        .await
    }

    pub async fn calendar_view(
        &self,
        year: i32,
        month: u32,
        week_number: Option<u32>,
    ) -> GarageResult<CalendarView> {
        self.request(|respond_to| ScheduleCommand::CalendarView {
            year,
            month,
            week_number,
            respond_to,
        })
        .await
    }

    pub async fn slots_for_date(&self, date: NaiveDate) -> GarageResult<Vec<Slot>> {
        self.request(|tx| ScheduleCommand::SlotsForDate(date, tx))
            .await
    }

    pub async fn modify_slot(&self, request: SlotModifyRequest) -> GarageResult<ModifyOutcome> {
        self.request(|tx| ScheduleCommand::ModifySlot(request, tx))
            .await
    }

    pub async fn delete_slot(&self, slot_id: String) -> GarageResult<()> {
        self.request(|tx| ScheduleCommand::DeleteSlot(slot_id, tx))
            .await
    }

    pub async fn delete_manual_slots(&self, date: NaiveDate) -> GarageResult<()> {
        self.request(|tx| ScheduleCommand::DeleteManualSlots(date, tx))
            .await
    }

    pub async fn bulk_modify(&self, request: BulkSlotRequest) -> GarageResult<()> {
        self.request(|tx| ScheduleCommand::BulkModify(request, tx))
            .await
    }

    /// Add a holiday and get back the refreshed list
    pub async fn add_holiday(&self, holiday: HolidayEntry) -> GarageResult<Vec<HolidayEntry>> {
        self.request(|tx| ScheduleCommand::AddHoliday(holiday, tx))
            .await
    }

    pub async fn list_holidays(&self) -> GarageResult<Vec<HolidayEntry>> {
        self.request(ScheduleCommand::ListHolidays).await
    }

    /// Delete a holiday and get back the refreshed list
    pub async fn delete_holiday(&self, month: u32, day: u32) -> GarageResult<Vec<HolidayEntry>> {
        self.request(|respond_to| ScheduleCommand::DeleteHoliday {
            month,
            day,
            respond_to,
        })
        .await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> GarageResult<()> {
        let _ = self.command_tx.send(ScheduleCommand::Shutdown).await;
        Ok(())
    }
}

impl ScheduleActor {
    /// Create a new actor and return its handle
    pub fn new(
        backend: Arc<dyn ScheduleBackend>,
        defaults: DayDefaults,
    ) -> (Self, ScheduleActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            backend,
            defaults,
            document: None,
            command_rx,
        };

        (actor, ScheduleActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Schedule actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                ScheduleCommand::GetPlan(respond_to) => {
                    let result = self.fetch_plan().await;
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::SavePlan {
                    plan,
                    replace,
                    respond_to,
                } => {
                    let result = self.save_plan(plan, replace).await;
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::CalendarView {
                    year,
                    month,
                    week_number,
                    respond_to,
                } => {
                    let result = self.backend.calendar_view(year, month, week_number).await;
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::SlotsForDate(date, respond_to) => {
                    let result = self.backend.slots_for_date(date).await;
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::ModifySlot(request, respond_to) => {
                    let result = self.backend.modify_slot_time(&request).await;
                    if matches!(&result, Ok(ModifyOutcome::Applied)) {
                        self.refresh_document().await;
                    }
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::DeleteSlot(slot_id, respond_to) => {
                    let result = self.backend.delete_slot(&slot_id).await;
                    if result.is_ok() {
                        self.refresh_document().await;
                    }
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::DeleteManualSlots(date, respond_to) => {
                    let result = self.backend.delete_manual_slots(date).await;
                    if result.is_ok() {
                        self.refresh_document().await;
                    }
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::BulkModify(request, respond_to) => {
                    let result = self.backend.bulk_modify(&request).await;
                    if result.is_ok() {
                        self.refresh_document().await;
                    }
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::AddHoliday(holiday, respond_to) => {
                    let result = match self.backend.add_holiday(&holiday).await {
                        Ok(()) => self.backend.holidays().await,
                        Err(e) => Err(e),
                    };
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::ListHolidays(respond_to) => {
                    let result = self.backend.holidays().await;
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::DeleteHoliday {
                    month,
                    day,
                    respond_to,
                } => {
                    let result = match self.backend.delete_holiday(month, day).await {
                        Ok(()) => self.backend.holidays().await,
                        Err(e) => Err(e),
                    };
                    let _ = respond_to.send(result).await;
                }
                ScheduleCommand::Shutdown => {
                    info!("Schedule actor shutting down");
                    break;
                }
            }
        }

        info!("Schedule actor shut down");
    }

    /// Fetch the document fresh and cache it
    async fn fetch_plan(&mut self) -> GarageResult<WeekPlan> {
        let doc = self.backend.fetch_schedule().await?;
        let plan = WeekPlan::from_wire(&doc, &self.defaults);
        self.document = Some(doc);
        Ok(plan)
    }

    /// Validate, submit, then refetch. The returned plan is what the
    /// backend holds after the save, not the locally edited one.
    async fn save_plan(&mut self, plan: WeekPlan, replace: bool) -> GarageResult<WeekPlan> {
        let doc = plan.to_wire()?;
        self.backend.save_schedule(&doc, replace).await?;
        self.fetch_plan().await
    }

    /// Pull the document again after a slot mutation. Failure to refresh is
    /// logged, not propagated; the mutation itself already succeeded.
    async fn refresh_document(&mut self) {
        match self.backend.fetch_schedule().await {
            Ok(doc) => {
                // A stamp change we did not cause means another editor wrote
                // in between; the refetched state wins either way.
                if let Some(previous) = &self.document {
                    if previous.updated_at != doc.updated_at && previous.updated_at.is_some() {
                        info!("Schedule was modified elsewhere; using the refetched state");
                    }
                }
                self.document = Some(doc);
            }
            Err(e) => warn!("Failed to refresh schedule after mutation: {}", e),
        }
    }
}

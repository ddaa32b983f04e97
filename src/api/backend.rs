use crate::error::GarageResult;
use crate::schedule::{
    BulkSlotRequest, CalendarView, HolidayEntry, ModifyOutcome, ScheduleDocument, Slot,
    SlotModifyRequest,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// The REST boundary of the garage-dashboard backend. Implemented over
/// HTTP by `HttpBackend` and by in-memory mocks in tests.
#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    /// Fetch the current weekly schedule document
    async fn fetch_schedule(&self) -> GarageResult<ScheduleDocument>;

    /// Submit the full schedule document. `replace` creates/replaces the
    /// document (POST); otherwise it updates in place (PUT).
    async fn save_schedule(&self, doc: &ScheduleDocument, replace: bool) -> GarageResult<()>;

    /// Month or week view with holiday markers
    async fn calendar_view(
        &self,
        year: i32,
        month: u32,
        week_number: Option<u32>,
    ) -> GarageResult<CalendarView>;

    /// Per-date slot listing with status and source
    async fn slots_for_date(&self, date: NaiveDate) -> GarageResult<Vec<Slot>>;

    /// Change one slot's time range; may come back with an overlap warning
    async fn modify_slot_time(&self, request: &SlotModifyRequest) -> GarageResult<ModifyOutcome>;

    /// Delete one manual slot by id
    async fn delete_slot(&self, slot_id: &str) -> GarageResult<()>;

    /// Delete every manual slot on the given date
    async fn delete_manual_slots(&self, date: NaiveDate) -> GarageResult<()>;

    /// Block or unblock all slots in a date and time range
    async fn bulk_modify(&self, request: &BulkSlotRequest) -> GarageResult<()>;

    /// Add a recurring single-date holiday
    async fn add_holiday(&self, holiday: &HolidayEntry) -> GarageResult<()>;

    /// List the recurring single-date holidays
    async fn holidays(&self) -> GarageResult<Vec<HolidayEntry>>;

    /// Delete a holiday by its month and day
    async fn delete_holiday(&self, month: u32, day: u32) -> GarageResult<()>;
}

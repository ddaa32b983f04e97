use async_trait::async_trait;
use chrono::NaiveDate;
use garagehours::api::{ScheduleBackend, ScheduleHandle};
use garagehours::error::{ApiFailure, Error, GarageResult};
use garagehours::schedule::{
    AffectedSlot, BreakEntry, BulkAction, BulkSlotRequest, CalendarView, DayDefaults,
    HolidayEntry, ModifyOutcome, OverlapWarning, ScheduleDocument, Slot, SlotModifyFlow,
    SlotModifyRequest, SlotSource, SlotStatus, Weekday,
};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the garage-dashboard backend
#[derive(Default)]
struct MockState {
    document: ScheduleDocument,
    holidays: Vec<HolidayEntry>,
    slots: Vec<Slot>,
    saves: u32,
    /// Warn about overlap until the request carries the override
    overlap_guard: bool,
}

#[derive(Default)]
struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    fn with_slots(slots: Vec<Slot>, overlap_guard: bool) -> Self {
        Self {
            state: Mutex::new(MockState {
                slots,
                overlap_guard,
                ..Default::default()
            }),
        }
    }

    fn saves(&self) -> u32 {
        self.state.lock().unwrap().saves
    }
}

fn slot(id: &str, start: &str, end: &str, status: SlotStatus) -> Slot {
    Slot {
        id: id.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        status,
        source: SlotSource::Database,
    }
}

#[async_trait]
impl ScheduleBackend for MockBackend {
    async fn fetch_schedule(&self) -> GarageResult<ScheduleDocument> {
        Ok(self.state.lock().unwrap().document.clone())
    }

    async fn save_schedule(&self, doc: &ScheduleDocument, _replace: bool) -> GarageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.saves += 1;
        state.document = doc.clone();
        state.document.updated_at = Some(format!("rev-{}", state.saves));
        Ok(())
    }

    async fn calendar_view(
        &self,
        year: i32,
        month: u32,
        _week_number: Option<u32>,
    ) -> GarageResult<CalendarView> {
        Ok(CalendarView {
            year,
            month,
            days: Vec::new(),
        })
    }

    async fn slots_for_date(&self, _date: NaiveDate) -> GarageResult<Vec<Slot>> {
        Ok(self.state.lock().unwrap().slots.clone())
    }

    async fn modify_slot_time(&self, request: &SlotModifyRequest) -> GarageResult<ModifyOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.overlap_guard && request.overlap != Some(true) {
            return Ok(ModifyOutcome::Overlap(OverlapWarning {
                message: "The new time range overlaps other slots".to_string(),
                affected_slots: vec![AffectedSlot {
                    id: "slot-2".to_string(),
                    start_time: "10:30".to_string(),
                    end_time: "11:30".to_string(),
                    status: Some(SlotStatus::Booked),
                }],
            }));
        }
        match state
            .slots
            .iter_mut()
            .find(|slot| slot.start_time == request.current_time)
        {
            Some(slot) => {
                slot.start_time = request.new_start_time.clone();
                slot.end_time = request.new_end_time.clone();
                Ok(ModifyOutcome::Applied)
            }
            None => Err(ApiFailure::rejected("Slot not found").into()),
        }
    }

    async fn delete_slot(&self, slot_id: &str) -> GarageResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.slots.len();
        state.slots.retain(|slot| slot.id != slot_id);
        if state.slots.len() == before {
            return Err(ApiFailure::rejected("Slot not found").into());
        }
        Ok(())
    }

    async fn delete_manual_slots(&self, _date: NaiveDate) -> GarageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.slots.retain(|slot| slot.source != SlotSource::Database);
        Ok(())
    }

    async fn bulk_modify(&self, request: &BulkSlotRequest) -> GarageResult<()> {
        let mut state = self.state.lock().unwrap();
        let status = match request.action {
            BulkAction::Block => SlotStatus::Blocked,
            BulkAction::Unblock => SlotStatus::Available,
        };
        for slot in state.slots.iter_mut() {
            if slot.status != SlotStatus::Booked {
                slot.status = status;
            }
        }
        Ok(())
    }

    async fn add_holiday(&self, holiday: &HolidayEntry) -> GarageResult<()> {
        let mut state = self.state.lock().unwrap();
        if state
            .holidays
            .iter()
            .any(|h| h.month == holiday.month && h.day == holiday.day)
        {
            return Err(ApiFailure::rejected("Holiday already exists").into());
        }
        state.holidays.push(holiday.clone());
        Ok(())
    }

    async fn holidays(&self) -> GarageResult<Vec<HolidayEntry>> {
        Ok(self.state.lock().unwrap().holidays.clone())
    }

    async fn delete_holiday(&self, month: u32, day: u32) -> GarageResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .holidays
            .retain(|h| !(h.month == month && h.day == day));
        Ok(())
    }
}

fn handle_over(backend: &Arc<MockBackend>) -> ScheduleHandle {
    let backend: Arc<MockBackend> = Arc::clone(backend);
    let backend: Arc<dyn ScheduleBackend> = backend;
    ScheduleHandle::with_backend(backend, DayDefaults::default())
}

/// Adding then removing a single-date holiday is visible through the list
#[tokio::test]
async fn holiday_add_and_remove_roundtrip() {
    let backend = Arc::new(MockBackend::default());
    let handle = handle_over(&backend);

    let christmas = HolidayEntry::new(12, 25, "Christmas").unwrap();
    let listed = handle.add_holiday(christmas).await.unwrap();
    assert!(listed.iter().any(|h| h.month == 12 && h.day == 25));

    let listed = handle.delete_holiday(12, 25).await.unwrap();
    assert!(!listed.iter().any(|h| h.month == 12 && h.day == 25));

    handle.shutdown().await.unwrap();
}

/// A duplicate holiday is rejected by the backend and surfaces as an API error
#[tokio::test]
async fn duplicate_holiday_is_rejected() {
    let backend = Arc::new(MockBackend::default());
    let handle = handle_over(&backend);

    let holiday = HolidayEntry::new(1, 1, "New Year").unwrap();
    handle.add_holiday(holiday.clone()).await.unwrap();

    let err = handle.add_holiday(holiday).await.unwrap_err();
    match err {
        Error::Api(failure) => assert_eq!(failure.message, "Holiday already exists"),
        other => panic!("Expected an API error, got {:?}", other),
    }

    handle.shutdown().await.unwrap();
}

/// Saving returns the refetched state, and an immediate round-trip through
/// the normalizer is structurally stable
#[tokio::test]
async fn save_refetches_and_roundtrips() {
    let backend = Arc::new(MockBackend::default());
    let handle = handle_over(&backend);

    let mut plan = handle.get_plan().await.unwrap();
    plan.day_mut(Weekday::Saturday).is_closed = true;
    plan.day_mut(Weekday::Monday)
        .breaks
        .push(BreakEntry::new("12:00", "13:00").with_description("Lunch"));
    plan.set_holiday(Weekday::Sunday);

    let saved = handle.save_plan(plan.clone(), false).await.unwrap();
    assert_eq!(backend.saves(), 1);

    // The refetched plan carries the backend's revision stamp
    assert_eq!(saved.updated_at.as_deref(), Some("rev-1"));

    // Break ids are regenerated on fetch, so compare the wire forms
    let mut submitted = plan.to_wire().unwrap();
    let mut returned = saved.to_wire().unwrap();
    submitted.updated_at = None;
    returned.updated_at = None;
    assert_eq!(submitted, returned);

    handle.shutdown().await.unwrap();
}

/// A plan that fails validation never reaches the backend
#[tokio::test]
async fn invalid_plan_is_blocked_before_the_network() {
    let backend = Arc::new(MockBackend::default());
    let handle = handle_over(&backend);

    let mut plan = handle.get_plan().await.unwrap();
    plan.day_mut(Weekday::Tuesday).from_time = "18:00".to_string();
    plan.day_mut(Weekday::Tuesday).to_time = "09:00".to_string();

    let err = handle.save_plan(plan, false).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("Tuesday"));
    assert_eq!(backend.saves(), 0);

    handle.shutdown().await.unwrap();
}

/// An inverted bulk date range is refused locally with a date-ordering message
#[tokio::test]
async fn bulk_request_with_inverted_dates_never_dispatches() {
    let err = BulkSlotRequest::new(
        "2025-06-10".parse().unwrap(),
        "2025-06-05".parse().unwrap(),
        "09:00",
        "17:00",
        BulkAction::Block,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(err
        .to_string()
        .contains("End date must be after or equal to start date"));
}

/// The overlap warning needs a confirmed second round-trip to apply
#[tokio::test]
async fn slot_modify_walks_the_two_phase_confirm() {
    let backend = Arc::new(MockBackend::with_slots(
        vec![
            slot("slot-1", "09:00", "10:00", SlotStatus::Available),
            slot("slot-2", "10:30", "11:30", SlotStatus::Booked),
        ],
        true,
    ));
    let handle = handle_over(&backend);

    let date: NaiveDate = "2025-06-10".parse().unwrap();
    let request = SlotModifyRequest::new(date, "09:00", "10:00", "10:00", "11:00", None).unwrap();
    let mut flow = SlotModifyFlow::new(request);

    // First round-trip: the backend warns instead of applying
    let first = flow.start_submission().unwrap();
    let outcome = handle.modify_slot(first).await.unwrap();
    flow.record_outcome(outcome);

    let warning = flow.pending_warning().expect("expected an overlap warning");
    assert_eq!(warning.affected_slots.len(), 1);
    assert_eq!(warning.affected_slots[0].id, "slot-2");

    // Second round-trip, confirmed: the override goes through
    flow.confirm_overlap().unwrap();
    let second = flow.start_submission().unwrap();
    assert_eq!(second.overlap, Some(true));
    let outcome = handle.modify_slot(second).await.unwrap();
    flow.record_outcome(outcome);
    assert!(flow.is_completed());

    let slots = handle.slots_for_date(date).await.unwrap();
    assert!(slots
        .iter()
        .any(|s| s.start_time == "10:00" && s.end_time == "11:00"));

    handle.shutdown().await.unwrap();
}

/// Deleting slots works through the handle and missing slots surface errors
#[tokio::test]
async fn slot_deletion_paths() {
    let backend = Arc::new(MockBackend::with_slots(
        vec![slot("slot-1", "09:00", "10:00", SlotStatus::Available)],
        false,
    ));
    let handle = handle_over(&backend);
    let date: NaiveDate = "2025-06-10".parse().unwrap();

    handle.delete_slot("slot-1").await.unwrap();
    assert!(handle.slots_for_date(date).await.unwrap().is_empty());

    let err = handle.delete_slot("slot-1").await.unwrap_err();
    assert!(matches!(err, Error::Api(_)));

    handle.shutdown().await.unwrap();
}

pub mod diff;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod requests;
pub mod time;

pub use diff::ScheduleDraft;
pub use models::{
    BreakEntry, CalendarDay, CalendarView, DayHours, DaySchedule, HolidayEntry, Interval,
    Restriction, RestrictionKind, ScheduleDocument, Slot, SlotSource, SlotStatus, Weekday,
};
pub use normalize::{DayDefaults, WeekPlan};
pub use requests::{
    AffectedSlot, BulkAction, BulkSlotRequest, ModifyOutcome, ModifyPhase, OverlapWarning,
    SlotModifyFlow, SlotModifyRequest,
};

use super::models::SlotStatus;
use super::time::{is_ordered, parse_time};
use crate::error::{validation_error, GarageResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bulk action over a date and time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BulkAction {
    Block,
    Unblock,
}

/// Block or unblock every slot in a date and time range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkSlotRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub action: BulkAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BulkSlotRequest {
    /// Build a bulk request, refusing invalid ranges before anything is sent
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: &str,
        end_time: &str,
        action: BulkAction,
        reason: Option<String>,
    ) -> GarageResult<Self> {
        if parse_time(start_time).is_none() {
            return Err(validation_error(format!(
                "Start time '{}' is not a valid HH:MM time",
                start_time
            )));
        }
        if parse_time(end_time).is_none() {
            return Err(validation_error(format!(
                "End time '{}' is not a valid HH:MM time",
                end_time
            )));
        }
        if !is_ordered(start_time, end_time) {
            return Err(validation_error("End time must be after start time"));
        }
        if end_date < start_date {
            return Err(validation_error(
                "End date must be after or equal to start date",
            ));
        }
        Ok(Self {
            start_date,
            end_date,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            action,
            reason,
        })
    }
}

/// Change one slot's time range on a specific date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotModifyRequest {
    pub date: NaiveDate,
    /// Start time of the slot as it currently exists
    pub current_time: String,
    pub new_start_time: String,
    pub new_end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set only on the second, user-confirmed submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<bool>,
}

impl SlotModifyRequest {
    /// Build a slot modification, rejecting no-op edits and inverted ranges
    pub fn new(
        date: NaiveDate,
        current_start: &str,
        current_end: &str,
        new_start: &str,
        new_end: &str,
        reason: Option<String>,
    ) -> GarageResult<Self> {
        if parse_time(new_start).is_none() {
            return Err(validation_error(format!(
                "New start time '{}' is not a valid HH:MM time",
                new_start
            )));
        }
        if parse_time(new_end).is_none() {
            return Err(validation_error(format!(
                "New end time '{}' is not a valid HH:MM time",
                new_end
            )));
        }
        if !is_ordered(new_start, new_end) {
            return Err(validation_error("New end time must be after new start time"));
        }
        if new_start == current_start && new_end == current_end {
            return Err(validation_error(
                "New times match the slot's current times",
            ));
        }
        Ok(Self {
            date,
            current_time: current_start.to_string(),
            new_start_time: new_start.to_string(),
            new_end_time: new_end.to_string(),
            reason,
            overlap: None,
        })
    }

    /// The second-phase request, forcing the change past an overlap warning
    pub fn with_overlap_override(mut self) -> Self {
        self.overlap = Some(true);
        self
    }
}

/// A slot touched by a proposed time change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedSlot {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub status: Option<SlotStatus>,
}

/// Soft failure from the slot-modify endpoint: the new range overlaps
/// other slots, and the caller may force it through
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlapWarning {
    pub message: String,
    #[serde(default)]
    pub affected_slots: Vec<AffectedSlot>,
}

/// What the backend did with a slot modification
#[derive(Debug, Clone, PartialEq)]
pub enum ModifyOutcome {
    /// The change was applied
    Applied,
    /// The change needs explicit confirmation before it is forced through
    Overlap(OverlapWarning),
}

/// Where a slot modification stands
#[derive(Debug, Clone, PartialEq)]
pub enum ModifyPhase {
    /// The request can still be changed or abandoned
    Editing,
    /// A submission is in flight
    Submitting,
    /// The backend warned about overlapping slots and waits for the user
    AwaitingConfirmation(OverlapWarning),
    /// The user accepted the warning; the next submission carries the override
    Confirmed,
    /// The change was applied
    Completed,
}

/// Drives a slot modification through submission and the optional
/// second, overlap-confirmed round-trip
#[derive(Debug, Clone)]
pub struct SlotModifyFlow {
    request: SlotModifyRequest,
    phase: ModifyPhase,
}

impl SlotModifyFlow {
    pub fn new(request: SlotModifyRequest) -> Self {
        Self {
            request,
            phase: ModifyPhase::Editing,
        }
    }

    pub fn phase(&self) -> &ModifyPhase {
        &self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == ModifyPhase::Completed
    }

    /// The warning waiting on the user, if any
    pub fn pending_warning(&self) -> Option<&OverlapWarning> {
        match &self.phase {
            ModifyPhase::AwaitingConfirmation(warning) => Some(warning),
            _ => None,
        }
    }

    /// Take the request for the next round-trip. After a confirmed warning
    /// the request carries the overlap override.
    pub fn start_submission(&mut self) -> GarageResult<SlotModifyRequest> {
        match self.phase {
            ModifyPhase::Editing => {
                self.phase = ModifyPhase::Submitting;
                Ok(self.request.clone())
            }
            ModifyPhase::Confirmed => {
                self.phase = ModifyPhase::Submitting;
                Ok(self.request.clone().with_overlap_override())
            }
            ModifyPhase::AwaitingConfirmation(_) => Err(validation_error(
                "The overlap warning must be confirmed or abandoned first",
            )),
            ModifyPhase::Submitting => {
                Err(validation_error("A submission is already in flight"))
            }
            ModifyPhase::Completed => {
                Err(validation_error("This modification is already applied"))
            }
        }
    }

    /// Record the backend's answer to a submission
    pub fn record_outcome(&mut self, outcome: ModifyOutcome) {
        if self.phase != ModifyPhase::Submitting {
            return;
        }
        self.phase = match outcome {
            ModifyOutcome::Applied => ModifyPhase::Completed,
            ModifyOutcome::Overlap(warning) => ModifyPhase::AwaitingConfirmation(warning),
        };
    }

    /// A validation or submit error returns the flow to the editable state
    pub fn record_error(&mut self) {
        if self.phase != ModifyPhase::Completed {
            self.phase = ModifyPhase::Editing;
        }
    }

    /// Accept the overlap warning; the next submission forces the change
    pub fn confirm_overlap(&mut self) -> GarageResult<()> {
        match self.phase {
            ModifyPhase::AwaitingConfirmation(_) => {
                self.phase = ModifyPhase::Confirmed;
                Ok(())
            }
            _ => Err(validation_error("There is no overlap warning to confirm")),
        }
    }

    /// Decline the warning and go back to editing
    pub fn abandon(&mut self) {
        self.record_error();
    }
}

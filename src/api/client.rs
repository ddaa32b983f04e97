use super::backend::ScheduleBackend;
use super::envelope::{normalize_message, ApiEnvelope};
use crate::config::Config;
use crate::error::{config_error, ApiFailure, GarageResult};
use crate::schedule::{
    AffectedSlot, BulkSlotRequest, CalendarView, HolidayEntry, ModifyOutcome, OverlapWarning,
    ScheduleDocument, Slot, SlotModifyRequest,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SCHEDULE_PATH: &str = "/api/garage-dashboard/schedule";
const CALENDAR_VIEW_PATH: &str = "/api/garage-dashboard/schedule/calendar-view";
const SLOTS_VIEW_PATH: &str = "/api/garage-dashboard/schedule/slots/view";
const SLOT_TIME_PATH: &str = "/api/garage-dashboard/schedule/slots/time";
const SLOTS_PATH: &str = "/api/garage-dashboard/schedule/slots";
const MANUAL_SLOTS_PATH: &str = "/api/garage-dashboard/schedule/slots/manual";
const BULK_MODIFY_PATH: &str = "/api/garage-dashboard/schedule/modify";
const HOLIDAY_PATH: &str = "/api/garage-dashboard/schedule/holiday";
const HOLIDAYS_PATH: &str = "/api/garage-dashboard/schedule/holidays";

/// HTTP implementation of the schedule backend
pub struct HttpBackend {
    base_url: String,
    token: String,
    client: Client,
}

/// Data payload of the slot-modify endpoint when the new range overlaps
/// other slots
#[derive(Debug, Deserialize)]
struct OverlapPayload {
    #[serde(default)]
    warning: bool,
    #[serde(default)]
    affected_slots: Vec<AffectedSlot>,
}

/// Body of the holiday delete request
#[derive(Debug, Serialize)]
struct HolidayKey {
    month: u32,
    day: u32,
}

impl HttpBackend {
    pub fn new(config: &Config) -> GarageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| config_error(&format!("Failed to build HTTP client: {}", e)))?;

        // Validate the base URL once, up front
        Url::parse(&config.api_base_url)
            .map_err(|e| config_error(&format!("Invalid API base URL: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            token: config.api_token.clone(),
            client,
        })
    }

    /// Build a URL for an endpoint path, with optional query parameters
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> GarageResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| config_error(&format!("Failed to build URL for {}: {}", path, e)))?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    /// Attach auth, send, and decode the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> GarageResult<ApiEnvelope<T>> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| ApiFailure::transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::CONFLICT {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            // The error body is usually an envelope too; salvage its message
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| value.get("message").map(normalize_message))
                .unwrap_or(body);
            return Err(ApiFailure::http(
                status.as_u16(),
                format!("HTTP {} - {}", status.as_u16(), message),
            )
            .into());
        }

        response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| ApiFailure::decode(format!("Failed to parse response: {}", e)).into())
    }
}

#[async_trait]
impl ScheduleBackend for HttpBackend {
    async fn fetch_schedule(&self) -> GarageResult<ScheduleDocument> {
        let url = self.endpoint(SCHEDULE_PATH, &[])?;
        debug!("Fetching schedule from {}", url);
        let envelope: ApiEnvelope<ScheduleDocument> = self.send(self.client.get(url)).await?;
        Ok(envelope.into_data()?)
    }

    async fn save_schedule(&self, doc: &ScheduleDocument, replace: bool) -> GarageResult<()> {
        let url = self.endpoint(SCHEDULE_PATH, &[])?;
        let request = if replace {
            self.client.post(url)
        } else {
            self.client.put(url)
        };
        let envelope: ApiEnvelope<Value> = self.send(request.json(doc)).await?;
        envelope.into_result()?;
        Ok(())
    }

    async fn calendar_view(
        &self,
        year: i32,
        month: u32,
        week_number: Option<u32>,
    ) -> GarageResult<CalendarView> {
        let mut query = vec![("year", year.to_string()), ("month", month.to_string())];
        if let Some(week) = week_number {
            query.push(("week_number", week.to_string()));
        }
        let url = self.endpoint(CALENDAR_VIEW_PATH, &query)?;
        let envelope: ApiEnvelope<CalendarView> = self.send(self.client.get(url)).await?;
        Ok(envelope.into_data()?)
    }

    async fn slots_for_date(&self, date: NaiveDate) -> GarageResult<Vec<Slot>> {
        let url = self.endpoint(
            SLOTS_VIEW_PATH,
            &[("date", date.format("%Y-%m-%d").to_string())],
        )?;
        let envelope: ApiEnvelope<Vec<Slot>> = self.send(self.client.get(url)).await?;
        Ok(envelope.into_data()?)
    }

    async fn modify_slot_time(&self, request: &SlotModifyRequest) -> GarageResult<ModifyOutcome> {
        let url = self.endpoint(SLOT_TIME_PATH, &[])?;
        let envelope: ApiEnvelope<OverlapPayload> =
            self.send(self.client.patch(url).json(request)).await?;

        if envelope.success {
            return Ok(ModifyOutcome::Applied);
        }
        // A rejection carrying affected slots is the overlap warning, not
        // a hard failure
        let message = envelope.display_message("The new time range overlaps other slots");
        match envelope.data {
            Some(payload) if payload.warning || !payload.affected_slots.is_empty() => {
                Ok(ModifyOutcome::Overlap(OverlapWarning {
                    message,
                    affected_slots: payload.affected_slots,
                }))
            }
            _ => Err(ApiFailure::rejected(message).into()),
        }
    }

    async fn delete_slot(&self, slot_id: &str) -> GarageResult<()> {
        let url = self.endpoint(&format!("{}/{}", SLOTS_PATH, slot_id), &[])?;
        let envelope: ApiEnvelope<Value> = self.send(self.client.delete(url)).await?;
        envelope.into_result()?;
        Ok(())
    }

    async fn delete_manual_slots(&self, date: NaiveDate) -> GarageResult<()> {
        let url = self.endpoint(
            MANUAL_SLOTS_PATH,
            &[("date", date.format("%Y-%m-%d").to_string())],
        )?;
        let envelope: ApiEnvelope<Value> = self.send(self.client.delete(url)).await?;
        envelope.into_result()?;
        Ok(())
    }

    async fn bulk_modify(&self, request: &BulkSlotRequest) -> GarageResult<()> {
        let url = self.endpoint(BULK_MODIFY_PATH, &[])?;
        let envelope: ApiEnvelope<Value> = self.send(self.client.post(url).json(request)).await?;
        envelope.into_result()?;
        Ok(())
    }

    async fn add_holiday(&self, holiday: &HolidayEntry) -> GarageResult<()> {
        let url = self.endpoint(HOLIDAY_PATH, &[])?;
        let envelope: ApiEnvelope<Value> = self.send(self.client.post(url).json(holiday)).await?;
        envelope.into_result()?;
        Ok(())
    }

    async fn holidays(&self) -> GarageResult<Vec<HolidayEntry>> {
        let url = self.endpoint(HOLIDAYS_PATH, &[])?;
        let envelope: ApiEnvelope<Vec<HolidayEntry>> = self.send(self.client.get(url)).await?;
        Ok(envelope.into_data()?)
    }

    async fn delete_holiday(&self, month: u32, day: u32) -> GarageResult<()> {
        let url = self.endpoint(HOLIDAY_PATH, &[])?;
        let envelope: ApiEnvelope<Value> = self
            .send(self.client.delete(url).json(&HolidayKey { month, day }))
            .await?;
        envelope.into_result()?;
        Ok(())
    }
}

use crate::error::ApiFailure;
use serde::Deserialize;
use serde_json::Value;

/// Response envelope used by every garage-dashboard endpoint
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    /// Either a plain string or an object nesting the real message
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Flatten a possibly-nested `message` value into a display string.
/// Objects yield their nested `message` field when present; anything else
/// falls back to its JSON text.
pub fn normalize_message(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(text)) => text.clone(),
            _ => Value::Object(map.clone()).to_string(),
        },
        other => other.to_string(),
    }
}

impl<T> ApiEnvelope<T> {
    /// The normalized message, or a fallback when the backend sent none
    pub fn display_message(&self, fallback: &str) -> String {
        self.message
            .as_ref()
            .map(normalize_message)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Collapse the envelope into a result. `success: false` becomes a
    /// rejected failure carrying the normalized message.
    pub fn into_result(self) -> Result<Option<T>, ApiFailure> {
        if self.success {
            Ok(self.data)
        } else {
            let message = self.display_message("Request failed");
            Err(ApiFailure::rejected(message))
        }
    }

    /// Like `into_result`, but the endpoint is expected to return data
    pub fn into_data(self) -> Result<T, ApiFailure> {
        self.into_result()?
            .ok_or_else(|| ApiFailure::decode("Response is missing its data payload"))
    }
}

use serde::{Deserialize, Serialize};

use crate::error_body::extract_message;

/// Envelope wrapping every backend response.
///
/// The `data` and `error` fields use `serde_json::value::RawValue` to defer
/// deserialization until the caller knows which payload type to expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<serde_json::value::RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Box<serde_json::value::RawValue>>,
}

impl ApiResponse {
    /// Creates a successful response with the given payload.
    pub fn ok<T: Serialize>(data: Option<&T>) -> Result<Self, serde_json::Error> {
        let raw = match data {
            Some(d) => {
                let json = serde_json::to_string(d)?;
                Some(serde_json::value::RawValue::from_string(json)?)
            }
            None => None,
        };
        Ok(Self {
            success: true,
            data: raw,
            error: None,
        })
    }

    /// Deserializes the `data` payload into the given type.
    pub fn parse_data<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        match &self.data {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }

    /// Extracts a display message from the `error` payload, tolerating the
    /// backend's three error-body shapes (string, object, `[{msg}]` array).
    pub fn error_message(&self) -> Option<String> {
        let raw = self.error.as_ref()?;
        let value: serde_json::Value = serde_json::from_str(raw.get()).ok()?;
        Some(extract_message(&value))
    }
}

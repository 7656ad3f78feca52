use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, GatewayError};
use crate::session::Message;

pub const RESET_MESSAGE: &str = "Conversation reset";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub reset: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl ChatRequest {
    /// Decodes a request body. Only a JSON object is a request; arrays are
    /// rejected even though serde would map them onto the fields.
    pub fn from_slice(raw: &[u8]) -> Result<Self, GatewayError> {
        let invalid = |e: serde_json::Error| {
            GatewayError::Validation(format!("Invalid request body: {}", e))
        };

        let value: Value = serde_json::from_slice(raw).map_err(invalid)?;
        if !value.is_object() {
            return Err(GatewayError::Validation(
                "Invalid request body: expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(invalid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Every response carries exactly one `status` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    Chat {
        response: String,
        status: Status,
        conversation_length: usize,
    },
    Reset {
        message: String,
        status: Status,
    },
    Error {
        error: String,
        status: Status,
        kind: ErrorKind,
    },
}

impl GatewayResponse {
    pub fn chat(response: String, conversation_length: usize) -> Self {
        GatewayResponse::Chat {
            response,
            status: Status::Success,
            conversation_length,
        }
    }

    pub fn reset() -> Self {
        GatewayResponse::Reset {
            message: RESET_MESSAGE.to_string(),
            status: Status::Success,
        }
    }

    pub fn error(err: &GatewayError) -> Self {
        GatewayResponse::Error {
            error: err.to_string(),
            status: Status::Error,
            kind: err.kind(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            GatewayResponse::Chat { status, .. }
            | GatewayResponse::Reset { status, .. }
            | GatewayResponse::Error { status, .. } => *status,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayResponse::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub version: String,
    /// Stamped at build time from `DEPLOYMENT_DATE`; `null` for local builds.
    pub deployment_date: Option<String>,
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    #[serde(flatten)]
    pub info: ServiceInfo,
    pub status: Status,
}

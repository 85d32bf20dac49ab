use aulos_events::PlaybackEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Error code of a [`MethodResult::Error`] for malformed arguments.
pub const INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";

/// One invocation on the method channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call carrying no arguments (`pause`, `stop`).
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }
}

/// Reply to a [`MethodCall`].
#[derive(Clone, Debug, PartialEq)]
pub enum MethodResult {
    Success(Value),
    /// The method name is not known.
    NotImplemented,
    Error { code: String, message: String },
}

impl MethodResult {
    /// `Success(true)`, the reply to every accepted command.
    #[must_use]
    pub fn ack() -> Self {
        Self::Success(Value::Bool(true))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Encode `event` as the flat record sent on the event channel.
pub fn encode_event(event: &PlaybackEvent) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(event)?)
}

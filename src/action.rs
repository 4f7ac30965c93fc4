use parse_display::Display;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// A record describing an intended state change.
pub trait Action: 'static {
    /// The tag used by reducers and logs to identify the action.
    fn action_type(&self) -> &str;
}

/// Untyped action in the `{ "type": ..., "payload": ... }` shape.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[display("{kind}")]
pub struct AnyAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Set when `payload` describes a failure.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

impl AnyAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
            error: false,
        }
    }

    /// Creates an action whose payload is the error that caused it.
    pub fn failure(kind: impl Into<String>, error: impl Into<Value>) -> Self {
        Self {
            error: true,
            ..Self::new(kind).with_payload(error)
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Deserializes the payload.
    ///
    /// Returns `None` if the payload is missing or has another shape.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(self.payload.as_ref()?).ok()
    }
}
impl Action for AnyAction {
    fn action_type(&self) -> &str {
        &self.kind
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A human-readable error message to surface to API clients or log lines.
#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone)]
pub struct ErrorMessage(pub String);

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ErrorMessage {
    fn default() -> Self {
        Self("An unexpected error occurred".to_string())
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A stable, machine-matchable name attached to an error so API clients can
/// branch on error kind without parsing the human-readable message.
#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq)]
pub struct ErrorName(pub String);

impl Display for ErrorName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ErrorName {
    fn default() -> Self {
        Self("E_UNKNOWN".to_string())
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse error taxonomy used by the reconciler and the control-plane API to
/// decide how an error propagates: whether it is retried, surfaced to a
/// client as 4xx, or treated as a startup-halting condition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Expected to succeed on retry (e.g. API server hiccup, lease contention).
    Transient,

    /// Will not succeed without external intervention (e.g. quota exceeded).
    Permanent,

    /// The caller supplied a malformed or semantically invalid request.
    Validation,

    /// The caller's credentials or permissions were rejected.
    Auth,

    /// The referenced resource does not exist.
    NotFound,

    /// The operation conflicts with the current state of the resource.
    Conflict,

    /// Unrecoverable: the process should stop.
    #[default]
    Fatal,
}

impl ErrorKind {
    /// Whether the reconciler should requeue on an error of this kind.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

use super::{Backtrace, ErrorCode, ErrorInner, ErrorKind, ErrorMessage, ErrorName};
use core::fmt::{Debug, Display};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Error {
    pub source: Arc<ErrorInner>,
    pub name: Option<ErrorName>,
    pub code: Option<ErrorCode>,
    pub kind: Option<ErrorKind>,
    pub message: Option<ErrorMessage>,
    pub backtrace: Option<Backtrace>,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = self.name.clone().unwrap_or_default();
        let message = self.message.clone().unwrap_or_default();
        write!(f, "[{name}] {message}")
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl<T: Into<ErrorInner>> From<T> for Error {
    fn from(error: T) -> Self {
        Self::new(error)
    }
}

impl Error {
    pub fn new<E: Into<ErrorInner>>(error: E) -> Self {
        let error = error.into();
        let message = error.to_string();
        Self {
            source: Arc::new(error),
            name: Some(Default::default()),
            code: Some(Default::default()),
            kind: None,
            message: Some(ErrorMessage(message)),
            backtrace: Some(std::backtrace::Backtrace::capture().into()),
        }
    }

    pub fn generic<U>(message: U) -> Self
    where
        U: Display + Debug + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(ErrorInner::Generic(message.to_string())),
            name: Some(ErrorName("E_GENERIC".to_string())),
            code: Some(ErrorCode::default()),
            kind: Some(ErrorKind::Fatal),
            message: Some(ErrorMessage(message.to_string())),
            backtrace: Some(std::backtrace::Backtrace::capture().into()),
        }
    }

    pub fn validation<U>(message: U) -> Self
    where
        U: Display + Debug + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(ErrorInner::Validation(message.to_string())),
            name: Some(ErrorName("E_VALIDATION".to_string())),
            code: Some(ErrorCode::from(axum::http::StatusCode::BAD_REQUEST)),
            kind: Some(ErrorKind::Validation),
            message: Some(ErrorMessage(message.to_string())),
            backtrace: Some(std::backtrace::Backtrace::capture().into()),
        }
    }

    pub fn not_found<U>(message: U) -> Self
    where
        U: Display + Debug + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(ErrorInner::Generic(message.to_string())),
            name: Some(ErrorName("E_NOT_FOUND".to_string())),
            code: Some(ErrorCode::from(axum::http::StatusCode::NOT_FOUND)),
            kind: Some(ErrorKind::NotFound),
            message: Some(ErrorMessage(message.to_string())),
            backtrace: Some(std::backtrace::Backtrace::capture().into()),
        }
    }

    pub fn source(&self) -> &ErrorInner {
        &self.source
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind.unwrap_or_default()
    }

    pub fn with_name<U>(self, name: U) -> Self
    where
        U: Display + Debug + Send + Sync + 'static,
    {
        Self {
            name: Some(ErrorName(name.to_string())),
            ..self
        }
    }

    pub fn with_message<U>(self, message: U) -> Self
    where
        U: Display + Debug + Send + Sync + 'static,
    {
        Self {
            message: Some(ErrorMessage(message.to_string())),
            ..self
        }
    }

    pub fn with_status<U>(self, status: U) -> Self
    where
        U: Into<ErrorCode> + Send + Sync + 'static,
    {
        Self {
            code: Some(status.into()),
            ..self
        }
    }

    pub fn with_kind(self, kind: ErrorKind) -> Self {
        Self {
            kind: Some(kind),
            ..self
        }
    }

    /// Emit a structured `tracing::error!` record and return self, so this can
    /// be chained at the tail of a `match result { Err(error) => error.trace() }`.
    pub fn trace(self) -> Self {
        let error_name = self.name.clone().unwrap_or_default().to_string();
        let error_code = self.code.unwrap_or_default().to_string();
        let error_kind = format!("{:?}", self.kind());
        let error_message = self.message.clone().unwrap_or_default().to_string();
        let error_backtrace = json!(self.backtrace.clone().unwrap_or_default()).to_string();
        tracing::error!({
            error.name = error_name,
            error.code = error_code,
            error.kind = error_kind,
            error.message = error_message,
            error.backtrace = error_backtrace,
        });
        self
    }
}

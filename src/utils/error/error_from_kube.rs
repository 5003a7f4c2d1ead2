use super::{Error, ErrorInner, ErrorKind};
use axum::http::StatusCode;

impl From<kube::Error> for Error {
    fn from(source: kube::Error) -> Self {
        match &source {
            kube::Error::Api(error) => {
                let code = error.code;
                let status_text = StatusCode::from_u16(code)
                    .unwrap_or_default()
                    .canonical_reason()
                    .unwrap_or_default()
                    .replace(' ', "_")
                    .to_uppercase();
                let name = format!("E_KUBE_API_{status_text}");
                let kind = match code {
                    404 => ErrorKind::NotFound,
                    409 => ErrorKind::Conflict,
                    401 | 403 => ErrorKind::Auth,
                    408 | 429 | 500..=599 => ErrorKind::Transient,
                    _ => ErrorKind::Permanent,
                };
                let source = ErrorInner::KubeError(source);
                Self::new(source)
                    .with_name(name)
                    .with_status(code)
                    .with_kind(kind)
            }

            // Failure to build a request to the Kubernetes API.
            kube::Error::BuildRequest(..) => {
                let source = ErrorInner::KubeError(source);
                Self::new(source)
                    .with_name("E_KUBE_BUILD_REQUEST")
                    .with_kind(ErrorKind::Permanent)
            }

            _ => {
                let message = format!("{source:?}");
                let source = ErrorInner::KubeError(source);
                Self::new(source)
                    .with_name("E_KUBE_API")
                    .with_message(message)
                    .with_kind(ErrorKind::Transient)
            }
        }
    }
}

impl<T> From<kube::runtime::finalizer::Error<T>> for Error
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(source: kube::runtime::finalizer::Error<T>) -> Self {
        match source {
            kube::runtime::finalizer::Error::ApplyFailed(error) => {
                Self::generic(format!("Failed to apply finalizer: {error}"))
                    .with_name("E_KUBE_FINALIZER_APPLY_FAILED")
                    .with_kind(ErrorKind::Transient)
            }
            kube::runtime::finalizer::Error::CleanupFailed(error) => {
                Self::generic(format!("Failed to clean up finalizer: {error}"))
                    .with_name("E_KUBE_FINALIZER_CLEANUP_FAILED")
                    .with_kind(ErrorKind::Transient)
            }
            kube::runtime::finalizer::Error::AddFinalizer(error) => {
                Self::generic(format!("Failed to add finalizer: {error}"))
                    .with_name("E_KUBE_FINALIZER_ADD")
                    .with_kind(ErrorKind::Transient)
            }
            kube::runtime::finalizer::Error::RemoveFinalizer(error) => {
                Self::generic(format!("Failed to remove finalizer: {error}"))
                    .with_name("E_KUBE_FINALIZER_REMOVE")
                    .with_kind(ErrorKind::Transient)
            }
            kube::runtime::finalizer::Error::UnnamedObject => {
                Self::generic("Unnamed object in finalizer error")
                    .with_name("E_KUBE_FINALIZER_UNNAMED_OBJECT")
                    .with_kind(ErrorKind::Permanent)
            }
            kube::runtime::finalizer::Error::InvalidFinalizer => {
                Self::generic("Invalid finalizer in finalizer error")
                    .with_name("E_KUBE_FINALIZER_INVALID_FINALIZER")
                    .with_kind(ErrorKind::Permanent)
            }
        }
    }
}

use thiserror::Error;

/// Source errors wrapped by [`super::Error`]. Kept as leaf `thiserror` variants
/// so the richer `Error` type can attach a stable name, HTTP status, taxonomy
/// kind, and backtrace without losing the original cause.
#[derive(Error, Debug)]
pub enum ErrorInner {
    #[error("{0}")]
    Generic(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("{0}")]
    KubeconfigError(#[from] kube::config::KubeconfigError),

    #[error("{0}")]
    InClusterError(#[from] kube::config::InClusterError),

    #[error("{0}")]
    KubeError(#[source] kube::Error),

    #[error("{0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("{0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("{0}")]
    AddrParseError(#[from] std::net::AddrParseError),
}

//! The control-plane HTTP API (§4.3): workspace and server lifecycle
//! endpoints served with `aide` over `axum`, documented into an OpenAPI
//! document served alongside Scalar/Redoc/Swagger UIs.

mod auth;
mod auth_context;
mod auth_docs;
mod docs;
mod health;
mod health_docs;
mod logs;
mod logs_body;
mod logs_docs;
mod server;
mod servers;
mod servers_body;
mod servers_docs;
mod workspaces;
mod workspaces_body;
mod workspaces_docs;

pub use auth_context::AuthenticatedUser;
pub use logs_body::{LogEntry, LogLevel, LogQuery, LogResponse};
pub use server::{Api, ApiContext, ApiOptions};
pub use servers_body::{PatchServerBody, ServerBody, ServerList};
pub use workspaces_body::{CreateWorkspaceBody, WorkspaceBody, WorkspaceList};

/// Every JSON body in this API carries an explicit `version` field (§4.3).
pub const API_VERSION: &str = "v1";

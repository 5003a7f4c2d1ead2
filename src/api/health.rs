use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::axum::IntoApiResponse;
use axum::extract::State;
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::SystemStatus;

use super::{health_docs, ApiContext};

/// Liveness response. `/health` (§4.3) never fails unless the process itself
/// is down; it reports metrics but never gates on them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthBody {
    pub status: String,
    pub version: String,
    pub system: SystemStatus,
}

pub async fn health(State(_ctx): State<ApiContext>) -> impl IntoApiResponse {
    Json(HealthBody {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        system: SystemStatus::default(),
    })
}

pub fn router(ctx: ApiContext) -> ApiRouter<()> {
    ApiRouter::new()
        .api_route("/", get_with(health, health_docs::health_docs))
        .with_state(ctx)
}

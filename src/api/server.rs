use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use aide::axum::routing::get;
use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use aide::redoc::Redoc;
use aide::scalar::Scalar;
use aide::swagger::Swagger;
use axum::Extension;
use clap::Parser;
use kube::Client;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthProvider;
use crate::operator::Controller;
use crate::{Error, Result};

/// Control-plane request deadline (§5): 30s default, 60s for log queries.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const LOG_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the control-plane HTTP server (§4.3, §6).
#[derive(Debug, Clone, Copy, Parser)]
pub struct ApiOptions {
    #[arg(long, env = "NIMBLETOOLS_API_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(short, long, env = "NIMBLETOOLS_API_PORT", default_value = "8080")]
    pub port: u16,
}

/// The stateless control-plane API (§4.3, §5): a cluster-API client pool
/// shared across handlers plus a reference to the loaded auth provider.
/// Holds the same [`Controller`] the operator uses so both binaries resolve
/// platform domain and cluster architecture identically.
#[derive(Clone)]
pub struct Api {
    address: SocketAddr,
    controller: Controller,
    auth_provider: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("address", &self.address)
            .field("controller", &"Controller(...)")
            .finish()
    }
}

pub type ApiContext = Arc<Api>;

impl Api {
    pub fn new(options: ApiOptions, controller: Controller, auth_provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            address: SocketAddr::new(options.host, options.port),
            controller,
            auth_provider,
        }
    }

    pub fn client(&self) -> Client {
        self.controller.client()
    }

    pub fn cluster_arch(&self) -> &str {
        self.controller.cluster_arch()
    }

    pub fn platform_domain(&self) -> &str {
        self.controller.platform_domain()
    }

    pub fn auth_provider(&self) -> &Arc<dyn AuthProvider> {
        &self.auth_provider
    }

    #[tracing::instrument(name = "Api", skip_all)]
    pub async fn start(self) -> Result<()> {
        aide::generate::extract_schemas(true);
        let address = self.address;
        let ctx = Arc::new(self);
        let mut api = OpenApi::default();

        let router = ApiRouter::new()
            .route("/openapi.json", get(super::docs::serve))
            .route("/", Scalar::new("/openapi.json").axum_route())
            .route("/redoc", Redoc::new("/openapi.json").axum_route())
            .route("/swagger", Swagger::new("/openapi.json").axum_route())
            .nest_api_service("/health", super::health::router(ctx.clone()))
            .nest_api_service("/auth", super::auth::router(ctx.clone()))
            .nest_api_service("/v1/workspaces", super::workspaces::router(ctx.clone()))
            .finish_api_with(&mut api, super::docs::openapi)
            .layer(Extension(api))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .with_state(ctx.clone());

        let listener = TcpListener::bind(&address).await.map_err(Error::from)?;
        tracing::info!("control-plane API listening on http://{address}");
        axum::serve(listener, router).await.map_err(Error::from)?;
        Ok(())
    }
}

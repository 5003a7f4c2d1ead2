use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::finalizer::{finalizer, Event};
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller as RuntimeController;
use kube::{Resource, ResourceExt};

use crate::utils::{server_label_selector, FIELD_MANAGER, FINALIZER, RECONCILE_REQUEUE_SECS, RECONCILE_TIMEOUT_SECS};
use crate::{Error, ErrorKind, Result};

use super::builders::{build_configmap, build_deployment, build_ingresses, WORKSPACE_SECRET_NAME};
use super::{
    condition_reason, determine_phase, has_terminal_pod_failure, resolve_image, Controller, DeploymentStatus,
    IntoResource, MCPService, MCPServicePhase, MCPServiceStatus, ResourceManager,
};

struct Context {
    controller: Controller,
}

/// Drive the `kube::runtime::Controller` for `MCPService` until the process
/// is told to stop (§4.1, §5). Watches cluster-wide, since workspaces are
/// namespaces and a single operator reconciles every workspace.
pub async fn run(controller: Controller) {
    if let Err(error) = controller.assert_crd_exists().await {
        error.trace();
        return;
    }

    let client = controller.client();
    let services: Api<MCPService> = Api::all(client.clone());
    let deployments: Api<Deployment> = Api::all(client.clone());
    let child_services: Api<Service> = Api::all(client.clone());
    let ingresses: Api<Ingress> = Api::all(client.clone());
    let configmaps: Api<ConfigMap> = Api::all(client.clone());
    let ctx = Arc::new(Context { controller });

    tracing::info!("starting MCPService reconciler");
    RuntimeController::new(services, WatcherConfig::default())
        .owns(deployments, WatcherConfig::default())
        .owns(child_services, WatcherConfig::default())
        .owns(ingresses, WatcherConfig::default())
        .owns(configmaps, WatcherConfig::default())
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok(action) => tracing::debug!(?action, "reconciled MCPService"),
                Err(error) => {
                    tracing::error!(%error, "reconcile stream error");
                }
            }
        })
        .await;
}

#[tracing::instrument(name = "Reconcile", skip_all, fields(service = %service.name_any()))]
async fn reconcile(service: Arc<MCPService>, ctx: Arc<Context>) -> Result<Action> {
    let client = ctx.controller.client();
    let namespace = service.namespace().unwrap_or_default();
    let api: Api<MCPService> = Api::namespaced(client, &namespace);

    tokio::time::timeout(
        Duration::from_secs(RECONCILE_TIMEOUT_SECS),
        finalizer(&api, FINALIZER, service, |event| async {
            match event {
                Event::Cleanup(service) => cleanup(&ctx, &service).await,
                Event::Apply(service) => apply(&ctx, &service).await,
            }
        }),
    )
    .await
    .map_err(|_| Error::generic("reconcile exceeded its per-call deadline").with_kind(ErrorKind::Transient))?
    .map_err(Error::from)
}

fn error_policy(_service: Arc<MCPService>, error: &Error, _ctx: Arc<Context>) -> Action {
    error.clone().trace();
    if error.kind().is_retryable() {
        Action::requeue(Duration::from_secs(5))
    } else {
        Action::requeue(Duration::from_secs(RECONCILE_REQUEUE_SECS))
    }
}

async fn cleanup(ctx: &Context, service: &MCPService) -> Result<Action> {
    let client = ctx.controller.client();
    let _ = <MCPService as IntoResource<Service>>::delete_resource(service, &client).await?;
    let _ = <MCPService as IntoResource<ConfigMap>>::delete_resource(service, &client).await?;
    delete_deployment(service, &client).await?;
    delete_ingresses(service, &client).await?;
    Ok(Action::await_change())
}

/// One pass of the §4.1 algorithm: validate, compute image, build children,
/// patch only on diff, derive phase, write status conditionally.
async fn apply(ctx: &Context, service: &MCPService) -> Result<Action> {
    let client = ctx.controller.client();
    let namespace = service.namespace().unwrap_or_default();

    // --- Step 1: validate tenancy labels.
    let Some(_identity) = service.tenancy_identity() else {
        write_failure(
            &client,
            service,
            condition_reason::INVALID_LABELS,
            "MCPService is missing required tenancy labels",
        )
        .await?;
        return Ok(Action::await_change());
    };

    // --- Step 2-3: resolve image reference and pull policy.
    let resolved = match resolve_image(&service.spec, ctx.controller.cluster_arch()) {
        Ok(resolved) => resolved,
        Err(error) => {
            write_failure(
                &client,
                service,
                condition_reason::ARCHITECTURE_MISMATCH,
                &error.to_string(),
            )
            .await?;
            return Ok(Action::await_change());
        }
    };

    // --- Read the workspace secret once, to decide which declared env
    // --- entries promote to a `secretKeyRef` (§4.1 secret-reference rule).
    let secret_keys = read_workspace_secret_keys(&client, &namespace).await?;

    // --- Step 4-5: build desired children and apply with Server-Side Apply,
    // --- so Kubernetes computes the diff rather than us doing string
    // --- equality — this already yields a no-op patch when nothing changed.
    let builder_ctx = ctx.controller.builder_context();
    let deployment = build_deployment(service, &resolved, &secret_keys, &builder_ctx)?;
    apply_child(&client, &namespace, owned(deployment, service)).await?;

    let _ = <MCPService as IntoResource<Service>>::patch_resource(service, &client).await?;

    match build_configmap(service)? {
        Some(configmap) => {
            apply_child(&client, &namespace, owned(configmap, service)).await?;
        }
        None => {
            let _ = <MCPService as IntoResource<ConfigMap>>::delete_resource(service, &client).await?;
        }
    }

    for ingress in build_ingresses(service, &builder_ctx)? {
        apply_child(&client, &namespace, owned(ingress, service)).await?;
    }

    // --- Step 6: observe status from the Deployment we just applied.
    let observed = Api::<Deployment>::namespaced(client.clone(), &namespace)
        .get(&super::builders::child_name(service))
        .await
        .map_err(Error::from)?;
    let status = observed.status.unwrap_or_default();
    let deployment_status = DeploymentStatus {
        ready: status.available_replicas.unwrap_or(0) > 0,
        replicas: status.replicas.unwrap_or(0),
        ready_replicas: status.ready_replicas.unwrap_or(0),
    };
    let available = status
        .conditions
        .unwrap_or_default()
        .iter()
        .any(|condition| condition.type_ == condition_reason::AVAILABLE && condition.status == "True");

    // --- Inspect owned pods for a failure that's past its grace period
    // --- (§4.1 step 6: ImagePullBackOff / sustained CrashLoopBackOff).
    let selector = server_label_selector(&service.server_name());
    let pods = Api::<Pod>::namespaced(client.clone(), &namespace)
        .list(&ListParams::default().labels(&selector))
        .await
        .map_err(Error::from)?;
    let terminal_failure = has_terminal_pod_failure(&pods.items);

    let phase = determine_phase(
        &deployment_status,
        service.spec.scaling.min_replicas,
        available,
        terminal_failure,
    );

    let new_status = MCPServiceStatus {
        phase,
        deployment_status,
        conditions: vec![Condition {
            type_: condition_reason::PROGRESSING.to_string(),
            status: if phase == MCPServicePhase::Running { "False" } else { "True" }.to_string(),
            reason: format!("{phase:?}"),
            message: String::new(),
            last_transition_time: k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(chrono::Utc::now()),
            observed_generation: service.metadata.generation,
        }],
        service_endpoint: Some(format!(
            "https://{}.{}",
            service.server_name(),
            builder_ctx.platform_domain
        )),
        last_reconcile_time: Some(chrono::Utc::now()),
    };

    // --- Step 7: write status only when something observable changed.
    let current_status = service.status.clone().unwrap_or_default();
    if !current_status.observably_equal(&new_status) {
        let _ = ResourceManager::patch_status(service, &client, new_status).await?;
    }

    Ok(Action::requeue(Duration::from_secs(RECONCILE_REQUEUE_SECS)))
}

async fn write_failure(
    client: &kube::Client,
    service: &MCPService,
    reason: &str,
    message: &str,
) -> Result<()> {
    let status = MCPServiceStatus {
        phase: MCPServicePhase::Failed,
        conditions: vec![Condition {
            type_: reason.to_string(),
            status: "True".to_string(),
            reason: reason.to_string(),
            message: message.to_string(),
            last_transition_time: k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(chrono::Utc::now()),
            observed_generation: service.metadata.generation,
        }],
        last_reconcile_time: Some(chrono::Utc::now()),
        ..Default::default()
    };
    let _ = ResourceManager::patch_status(service, client, status).await?;
    Ok(())
}

async fn read_workspace_secret_keys(client: &kube::Client, namespace: &str) -> Result<HashSet<String>> {
    let api: Api<Secret> = Api::namespaced(client.clone(), namespace);
    match api.get(WORKSPACE_SECRET_NAME).await {
        Ok(secret) => Ok(secret.data.unwrap_or_default().into_keys().collect()),
        Err(kube::Error::Api(error)) if error.code == 404 => Ok(HashSet::new()),
        Err(error) => Err(Error::from(error)),
    }
}

fn owned<K>(mut object: K, service: &MCPService) -> K
where
    K: Resource<DynamicType = ()>,
    K::DynamicType: Default,
{
    if let Some(owner_ref) = service.controller_owner_ref(&()) {
        object.meta_mut().owner_references = Some(vec![owner_ref]);
    }
    object
}

async fn apply_child<K>(client: &kube::Client, namespace: &str, object: K) -> Result<K>
where
    K: Resource<Scope = k8s_openapi::NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + serde::de::DeserializeOwned,
    K::DynamicType: Default,
{
    let name = object.meta().name.clone().unwrap_or_default();
    Api::<K>::namespaced(client.clone(), namespace)
        .patch(&name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(object))
        .await
        .map_err(Error::from)
}

async fn delete_deployment(service: &MCPService, client: &kube::Client) -> Result<()> {
    let namespace = service.namespace().unwrap_or_default();
    let name = super::builders::child_name(service);
    match Api::<Deployment>::namespaced(client.clone(), &namespace)
        .delete(&name, &Default::default())
        .await
    {
        Ok(..) => Ok(()),
        Err(kube::Error::Api(error)) if error.code == 404 => Ok(()),
        Err(error) => Err(Error::from(error)),
    }
}

async fn delete_ingresses(service: &MCPService, client: &kube::Client) -> Result<()> {
    let namespace = service.namespace().unwrap_or_default();
    let name = super::builders::child_name(service);
    let api: Api<Ingress> = Api::namespaced(client.clone(), &namespace);
    for ingress_type in ["mcp", "health"] {
        match api.delete(&format!("{name}-{ingress_type}"), &Default::default()).await {
            Ok(..) => {}
            Err(kube::Error::Api(error)) if error.code == 404 => {}
            Err(error) => return Err(Error::from(error)),
        }
    }
    Ok(())
}

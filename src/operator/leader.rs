use std::time::Duration;

use kube_leader_election::{LeaseLock, LeaseLockParams, LeaseLockResult};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::utils::LEADER_LEASE_NAME;
use crate::Result;

use super::Controller;

const LEASE_TTL: Duration = Duration::from_secs(15);
const RENEW_EVERY: Duration = Duration::from_secs(5);

/// Run the reconciler under leader election (§5): only the replica holding
/// the lease runs `kube::runtime::Controller::run`; standby replicas poll
/// the lease and start/abort the controller task on acquire/lose.
pub async fn run_with_leader_election(controller: Controller, shutdown: CancellationToken) -> Result<()> {
    let holder_id = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("nimbletools-core-operator-{}", Uuid::new_v4()));

    let leadership = LeaseLock::new(
        controller.client(),
        controller.lease_namespace(),
        LeaseLockParams {
            holder_id,
            lease_name: LEADER_LEASE_NAME.to_string(),
            lease_ttl: LEASE_TTL,
        },
    );

    let mut reconcile_task: Option<JoinHandle<()>> = None;
    let mut tick = tokio::time::interval(RENEW_EVERY);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                if let Some(task) = reconcile_task.take() {
                    task.abort();
                    let _ = task.await;
                }
                tracing::info!("operator shutting down");
                return Ok(());
            }
            _ = tick.tick() => {}
        }

        let lease = match leadership.try_acquire_or_renew().await {
            Ok(lease) => lease,
            Err(error) => {
                tracing::warn!(%error, "leader election renew/acquire failed");
                if let Some(task) = reconcile_task.take() {
                    task.abort();
                    tracing::warn!("aborted reconciler due to leader election error");
                }
                continue;
            }
        };

        if matches!(lease, LeaseLockResult::Acquired(_)) {
            if reconcile_task.is_none() {
                tracing::info!("acquired leadership; starting reconciler");
                let controller = controller.clone();
                reconcile_task = Some(tokio::spawn(async move {
                    super::reconcile::run(controller).await;
                }));
            }
        } else if let Some(task) = reconcile_task.take() {
            tracing::info!("lost leadership; stopping reconciler");
            task.abort();
        }
    }
}

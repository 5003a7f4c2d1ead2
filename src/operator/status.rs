use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::CRASH_LOOP_RESTART_THRESHOLD;

/// Transport protocol the server speaks once running.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum Protocol {
    #[default]
    Http,
    Stdio,
}

/// `MCPServicePhase` represents the current lifecycle phase of the service.
#[derive(Debug, Copy, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum MCPServicePhase {
    /// Initial or transient observation; never a terminal resting state.
    #[default]
    Unknown,

    /// Converging: fewer than the desired ready replicas and no failure observed.
    Pending,

    /// `readyReplicas >= max(1, minReplicas)` and the workload reports `Available`.
    Running,

    /// Terminal error: validation rejection, architecture mismatch, or a
    /// pod failure that persisted past the grace period.
    Failed,
}

/// Condition type strings written to `status.conditions`, mirroring the
/// `reason` field Kubernetes conditions carry.
pub mod condition_reason {
    pub const INVALID_LABELS: &str = "InvalidLabels";
    pub const ARCHITECTURE_MISMATCH: &str = "ArchitectureMismatch";
    pub const IMAGE_PULL_BACKOFF: &str = "ImagePullBackOff";
    pub const CRASH_LOOP: &str = "CrashLoopBackOff";
    pub const AVAILABLE: &str = "Available";
    pub const PROGRESSING: &str = "Progressing";
}

/// Summary of the owned workload's rollout state.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub ready: bool,
    pub replicas: i32,
    pub ready_replicas: i32,
}

/// `MCPService` status, written only by the operator.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MCPServiceStatus {
    pub phase: MCPServicePhase,

    #[serde(default)]
    pub deployment_status: DeploymentStatus,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Externally reachable URL once `routing` has been realized as an Ingress.
    #[serde(default)]
    pub service_endpoint: Option<String>,

    #[serde(default)]
    pub last_reconcile_time: Option<DateTime<Utc>>,
}

/// Derive the observed phase from the owned Deployment's rollout state
/// (§4.1 step 6). Pure: no I/O, just the three signals the reconciler reads
/// off the Deployment status and a terminal-failure flag it computes from
/// pod conditions.
pub fn determine_phase(
    deployment_status: &DeploymentStatus,
    min_replicas: i32,
    available: bool,
    terminal_failure: bool,
) -> MCPServicePhase {
    if terminal_failure {
        return MCPServicePhase::Failed;
    }
    let required = min_replicas.max(1);
    if deployment_status.ready_replicas >= required && available {
        MCPServicePhase::Running
    } else if deployment_status.replicas > 0 || deployment_status.ready_replicas > 0 {
        MCPServicePhase::Pending
    } else {
        MCPServicePhase::Unknown
    }
}

/// Inspect owned Pods for a failure that has passed its grace period (§4.1
/// step 6): `ImagePullBackOff`/`ErrImagePull` is reported by the kubelet
/// only after its own retry backoff has kicked in, so its mere presence
/// already means "past threshold"; `CrashLoopBackOff` additionally needs a
/// minimum restart count so a container's first crash doesn't immediately
/// flip the service to `Failed`. Pure: no I/O, just the pod statuses handed
/// to it.
pub fn has_terminal_pod_failure(pods: &[Pod]) -> bool {
    pods.iter().any(|pod| {
        pod.status.as_ref().is_some_and(|status| {
            status.container_statuses.as_ref().is_some_and(|statuses| {
                statuses.iter().any(|container_status| {
                    let reason = container_status
                        .state
                        .as_ref()
                        .and_then(|state| state.waiting.as_ref())
                        .and_then(|waiting| waiting.reason.as_deref());
                    match reason {
                        Some(condition_reason::IMAGE_PULL_BACKOFF) | Some("ErrImagePull") => true,
                        Some(condition_reason::CRASH_LOOP) => {
                            container_status.restart_count >= CRASH_LOOP_RESTART_THRESHOLD
                        }
                        _ => false,
                    }
                })
            })
        })
    })
}

impl MCPServiceStatus {
    /// Semantic equality ignoring `last_reconcile_time`, used to skip a
    /// status write when nothing observable changed (§4.1 step 7).
    pub fn observably_equal(&self, other: &Self) -> bool {
        self.phase == other.phase
            && self.deployment_status == other.deployment_status
            && self.conditions.len() == other.conditions.len()
            && self
                .conditions
                .iter()
                .zip(other.conditions.iter())
                .all(|(a, b)| a.type_ == b.type_ && a.status == b.status && a.reason == b.reason)
            && self.service_endpoint == other.service_endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ContainerState, ContainerStateWaiting, ContainerStatus, PodStatus};

    fn pod_with_waiting_reason(reason: &str, restart_count: i32) -> Pod {
        Pod {
            status: Some(PodStatus {
                container_statuses: Some(vec![ContainerStatus {
                    name: "mcp-server".to_string(),
                    restart_count,
                    state: Some(ContainerState {
                        waiting: Some(ContainerStateWaiting {
                            reason: Some(reason.to_string()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_has_terminal_pod_failure_image_pull_backoff_is_immediate() {
        let pods = vec![pod_with_waiting_reason("ImagePullBackOff", 0)];
        assert!(has_terminal_pod_failure(&pods));
    }

    #[test]
    fn test_has_terminal_pod_failure_crash_loop_below_threshold_is_not_terminal() {
        let pods = vec![pod_with_waiting_reason("CrashLoopBackOff", 1)];
        assert!(!has_terminal_pod_failure(&pods));
    }

    #[test]
    fn test_has_terminal_pod_failure_crash_loop_past_threshold_is_terminal() {
        let pods = vec![pod_with_waiting_reason("CrashLoopBackOff", CRASH_LOOP_RESTART_THRESHOLD)];
        assert!(has_terminal_pod_failure(&pods));
    }

    #[test]
    fn test_has_terminal_pod_failure_running_container_is_not_terminal() {
        let pod = Pod {
            status: Some(PodStatus {
                container_statuses: Some(vec![ContainerStatus {
                    name: "mcp-server".to_string(),
                    restart_count: 0,
                    state: Some(ContainerState::default()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!has_terminal_pod_failure(&[pod]));
    }

    #[test]
    fn test_has_terminal_pod_failure_no_pods_is_false() {
        assert!(!has_terminal_pod_failure(&[]));
    }

    #[test]
    fn test_status_default_is_unknown() {
        let status = MCPServiceStatus::default();
        assert_eq!(status.phase, MCPServicePhase::Unknown);
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn test_observably_equal_ignores_reconcile_time() {
        let mut a = MCPServiceStatus {
            phase: MCPServicePhase::Running,
            ..Default::default()
        };
        let mut b = a.clone();
        a.last_reconcile_time = Some(Utc::now());
        b.last_reconcile_time = None;
        assert!(a.observably_equal(&b));
    }

    #[test]
    fn test_observably_equal_detects_phase_change() {
        let a = MCPServiceStatus {
            phase: MCPServicePhase::Pending,
            ..Default::default()
        };
        let b = MCPServiceStatus {
            phase: MCPServicePhase::Running,
            ..Default::default()
        };
        assert!(!a.observably_equal(&b));
    }

    #[test]
    fn test_determine_phase_running_when_ready_and_available() {
        let status = DeploymentStatus {
            ready: true,
            replicas: 2,
            ready_replicas: 2,
        };
        assert_eq!(determine_phase(&status, 1, true, false), MCPServicePhase::Running);
    }

    #[test]
    fn test_determine_phase_pending_when_rolling_out() {
        let status = DeploymentStatus {
            ready: false,
            replicas: 2,
            ready_replicas: 1,
        };
        assert_eq!(determine_phase(&status, 2, false, false), MCPServicePhase::Pending);
    }

    #[test]
    fn test_determine_phase_unknown_when_no_replicas_observed() {
        let status = DeploymentStatus::default();
        assert_eq!(determine_phase(&status, 1, false, false), MCPServicePhase::Unknown);
    }

    #[test]
    fn test_determine_phase_failed_overrides_everything() {
        let status = DeploymentStatus {
            ready: true,
            replicas: 2,
            ready_replicas: 2,
        };
        assert_eq!(determine_phase(&status, 1, true, true), MCPServicePhase::Failed);
    }

    #[test]
    fn test_determine_phase_scaled_to_zero_is_running() {
        let status = DeploymentStatus {
            ready: true,
            replicas: 0,
            ready_replicas: 0,
        };
        assert_eq!(determine_phase(&status, 0, true, false), MCPServicePhase::Running);
    }
}

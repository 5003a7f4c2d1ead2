/// Field manager name used for every Server-Side Apply patch this project issues.
pub const FIELD_MANAGER: &str = "nimbletools-core";

/// Finalizer attached to every `MCPService` so deletion can tear down owned
/// cluster-scoped resources before the object is removed from etcd.
pub const FINALIZER: &str = "mcp.nimbletools.dev/finalizer";

/// Name of the `Lease` object used for operator leader election.
pub const LEADER_LEASE_NAME: &str = "nimbletools-core-operator";

/// Default namespace the leader election `Lease` lives in when not overridden.
pub const LEADER_LEASE_NAMESPACE: &str = "nimbletools-system";

/// Upper bound on a single reconcile pass before it's considered stuck and requeued.
pub const RECONCILE_TIMEOUT_SECS: u64 = 30;

/// Requeue interval applied after a successful reconcile, to notice drift
/// that wouldn't otherwise generate a watch event (e.g. an external patch).
pub const RECONCILE_REQUEUE_SECS: u64 = 300;

/// Default `limit` for `GET .../logs` when the caller doesn't specify one.
pub const LOG_QUERY_LIMIT_DEFAULT: i64 = 10;

/// Ceiling on `limit` to keep a single log request bounded.
pub const LOG_QUERY_LIMIT_MAX: i64 = 1000;

/// Restart count a `CrashLoopBackOff` container must reach before the
/// reconciler treats it as a terminal failure rather than an in-progress
/// rollout (§4.1 step 6: "sustained beyond grace period").
pub const CRASH_LOOP_RESTART_THRESHOLD: i32 = 5;

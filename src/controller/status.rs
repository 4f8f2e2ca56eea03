use serde_json::{Value, json};
use tracing::warn;

use crate::cluster::ClusterApi;

/// Reconciliation outcome written back onto the parent's status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Disabled,
    Converged { replicas: i32, image: String },
    Errored { image: String, cause: String },
}

/// Project an outcome onto the exact status fields it owns. `Errored` omits
/// `replicas` so a merge patch keeps the best-known previous value.
pub fn status_patch(outcome: &Outcome, now: &str) -> Value {
    match outcome {
        Outcome::Disabled => json!({
            "status": {
                "replicas": null,
                "image": null,
                "ready": false,
                "error": "",
                "lastUpdated": now,
            }
        }),
        Outcome::Converged { replicas, image } => json!({
            "status": {
                "replicas": replicas,
                "image": image,
                "ready": true,
                "error": "",
                "lastUpdated": now,
            }
        }),
        Outcome::Errored { image, cause } => json!({
            "status": {
                "image": image,
                "ready": false,
                "error": cause,
                "lastUpdated": now,
            }
        }),
    }
}

/// Write the outcome onto the parent. A status-write failure must never mask
/// the reconciliation outcome itself, so it is logged and swallowed.
pub async fn report(
    api: &dyn ClusterApi,
    namespace: &str,
    name: &str,
    outcome: Outcome,
) {
    let now = chrono::Utc::now().to_rfc3339();
    let patch = status_patch(&outcome, &now);
    if let Err(e) = api.patch_parent_status(namespace, name, &patch).await {
        warn!(error = %e, %namespace, %name, ?outcome, "status write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converged_sets_all_fields() {
        let patch = status_patch(
            &Outcome::Converged {
                replicas: 2,
                image: "svc:1.0".into(),
            },
            "t0",
        );
        assert_eq!(patch["status"]["replicas"], 2);
        assert_eq!(patch["status"]["image"], "svc:1.0");
        assert_eq!(patch["status"]["ready"], true);
        assert_eq!(patch["status"]["error"], "");
        assert_eq!(patch["status"]["lastUpdated"], "t0");
    }

    #[test]
    fn disabled_clears_observed_values() {
        let patch = status_patch(&Outcome::Disabled, "t0");
        assert!(patch["status"]["replicas"].is_null());
        assert!(patch["status"]["image"].is_null());
        assert_eq!(patch["status"]["ready"], false);
        assert_eq!(patch["status"]["error"], "");
    }

    #[test]
    fn errored_keeps_previous_replicas_by_omission() {
        let patch = status_patch(
            &Outcome::Errored {
                image: "svc:1.0".into(),
                cause: "infrastructure error: boom".into(),
            },
            "t0",
        );
        assert!(patch["status"].get("replicas").is_none());
        assert_eq!(patch["status"]["ready"], false);
        assert_eq!(patch["status"]["error"], "infrastructure error: boom");
    }
}

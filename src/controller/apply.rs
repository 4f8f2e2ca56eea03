use serde_json::Value;
use tracing::debug;

use super::ReconcileError;
use crate::cluster::{ChildKind, ClusterApi};

/// The idempotent "converge one object" primitive: create if absent, patch
/// with the full desired document if present. Cluster failures propagate
/// untouched; the driver is the single error boundary for an invocation.
pub async fn converge(
    api: &dyn ClusterApi,
    kind: ChildKind,
    namespace: Option<&str>,
    name: &str,
    desired: &Value,
) -> Result<(), ReconcileError> {
    match api.get(kind, namespace, name).await? {
        None => {
            debug!(%kind, name, "creating");
            api.create(kind, namespace, desired).await?;
        }
        Some(_) => {
            debug!(%kind, name, "patching");
            api.patch(kind, namespace, name, desired).await?;
        }
    }
    Ok(())
}

/// Serialize a typed document and converge it, reading kind/namespace/name
/// from its metadata.
pub async fn converge_typed<T>(
    api: &dyn ClusterApi,
    kind: ChildKind,
    doc: &T,
) -> Result<(), ReconcileError>
where
    T: serde::Serialize + k8s_openapi::Metadata<
        Ty = k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
    >,
{
    let meta = doc.metadata();
    let name = meta
        .name
        .clone()
        .ok_or_else(|| ReconcileError::Config("document has no name".into()))?;
    let namespace = meta.namespace.clone();
    let desired = serde_json::to_value(doc)
        .map_err(|e| ReconcileError::Config(e.to_string()))?;
    converge(api, kind, namespace.as_deref(), &name, &desired).await
}

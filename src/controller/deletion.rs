use tracing::info;

use super::ReconcileError;
use crate::builders::names;
use crate::cluster::{ChildKind, ClusterApi};

/// One logical group of child resources with its own enable toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Rbac,
    Secret,
    ConfigMap,
    Network,
    Workload,
}

/// Teardown order for the master-off and finalizer paths.
pub const ALL_CATEGORIES: [Category; 5] = [
    Category::Rbac,
    Category::Secret,
    Category::ConfigMap,
    Category::Network,
    Category::Workload,
];

/// Remove every live object of one category belonging to this parent.
/// Already-absent objects are success. Name matching is exact, per the
/// deterministic suffix contract; Services are the one multi-instance
/// category and are enumerated by the parent's exact label selector.
pub async fn delete_category(
    api: &dyn ClusterApi,
    category: Category,
    namespace: &str,
    parent_name: &str,
) -> Result<(), ReconcileError> {
    info!(?category, parent = parent_name, "deleting category");
    let ns = Some(namespace);
    match category {
        Category::Rbac => {
            api.delete(
                ChildKind::ServiceAccount,
                ns,
                &names::service_account(parent_name),
            )
            .await?;
            api.delete(ChildKind::Role, ns, &names::role(parent_name))
                .await?;
            api.delete(
                ChildKind::RoleBinding,
                ns,
                &names::role_binding(parent_name),
            )
            .await?;
            // Cluster-scoped pair: not reachable by cascade deletion, so the
            // toggle-off and master-off paths are the only cleanup they get.
            api.delete(
                ChildKind::ClusterRole,
                None,
                &names::cluster_role(parent_name),
            )
            .await?;
            api.delete(
                ChildKind::ClusterRoleBinding,
                None,
                &names::cluster_role_binding(parent_name),
            )
            .await?;
        }
        Category::Secret => {
            api.delete(ChildKind::Secret, ns, &names::secret(parent_name))
                .await?;
        }
        Category::ConfigMap => {
            api.delete(ChildKind::ConfigMap, ns, &names::config_map(parent_name))
                .await?;
        }
        Category::Network => {
            api.delete(ChildKind::Ingress, ns, &names::ingress(parent_name))
                .await?;
            let selector = names::owner_selector(parent_name);
            for svc in
                api.list_names(ChildKind::Service, ns, &selector).await?
            {
                api.delete(ChildKind::Service, ns, &svc).await?;
            }
        }
        Category::Workload => {
            api.delete(
                ChildKind::Deployment,
                ns,
                &names::workload(parent_name),
            )
            .await?;
        }
    }
    Ok(())
}

/// Master-off / parent-deletion teardown across every category.
pub async fn delete_all(
    api: &dyn ClusterApi,
    namespace: &str,
    parent_name: &str,
) -> Result<(), ReconcileError> {
    for category in ALL_CATEGORIES {
        delete_category(api, category, namespace, parent_name).await?;
    }
    Ok(())
}

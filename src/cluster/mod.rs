use async_trait::async_trait;
use kube::api::{
    Api, DeleteParams, ListParams, Patch, PatchParams, PostParams,
};
use kube::core::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::{Client, ResourceExt};
use serde_json::Value;

use crate::crd::managed_deployment::ManagedDeployment;

/// Every child kind this operator manages, with enough API metadata to build
/// a dynamic client for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildKind {
    Deployment,
    Service,
    Ingress,
    ServiceAccount,
    Role,
    RoleBinding,
    ClusterRole,
    ClusterRoleBinding,
    Secret,
    ConfigMap,
}

impl ChildKind {
    pub fn gvk(&self) -> GroupVersionKind {
        match self {
            Self::Deployment => GroupVersionKind::gvk("apps", "v1", "Deployment"),
            Self::Service => GroupVersionKind::gvk("", "v1", "Service"),
            Self::Ingress => {
                GroupVersionKind::gvk("networking.k8s.io", "v1", "Ingress")
            }
            Self::ServiceAccount => {
                GroupVersionKind::gvk("", "v1", "ServiceAccount")
            }
            Self::Role => {
                GroupVersionKind::gvk("rbac.authorization.k8s.io", "v1", "Role")
            }
            Self::RoleBinding => GroupVersionKind::gvk(
                "rbac.authorization.k8s.io",
                "v1",
                "RoleBinding",
            ),
            Self::ClusterRole => GroupVersionKind::gvk(
                "rbac.authorization.k8s.io",
                "v1",
                "ClusterRole",
            ),
            Self::ClusterRoleBinding => GroupVersionKind::gvk(
                "rbac.authorization.k8s.io",
                "v1",
                "ClusterRoleBinding",
            ),
            Self::Secret => GroupVersionKind::gvk("", "v1", "Secret"),
            Self::ConfigMap => GroupVersionKind::gvk("", "v1", "ConfigMap"),
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            Self::Deployment => "deployments",
            Self::Service => "services",
            Self::Ingress => "ingresses",
            Self::ServiceAccount => "serviceaccounts",
            Self::Role => "roles",
            Self::RoleBinding => "rolebindings",
            Self::ClusterRole => "clusterroles",
            Self::ClusterRoleBinding => "clusterrolebindings",
            Self::Secret => "secrets",
            Self::ConfigMap => "configmaps",
        }
    }

    /// ClusterRole and ClusterRoleBinding live outside any namespace; cascade
    /// deletion from a namespaced owner does not reach them.
    pub fn cluster_scoped(&self) -> bool {
        matches!(self, Self::ClusterRole | Self::ClusterRoleBinding)
    }

    fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.gvk(), self.plural())
    }
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gvk().kind)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("kubernetes api error: {0}")]
    Kube(#[from] kube::Error),
    #[error("manifest serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// Constructor-injected interface over the cluster API. The reconciliation
/// driver only ever talks to the cluster through this trait, so it can run
/// against an in-memory fake in tests.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch a live object, `None` when absent.
    async fn get(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<Value>, ApiError>;

    async fn create(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        manifest: &Value,
    ) -> Result<(), ApiError>;

    /// Full-document merge patch. Fields absent from the desired document are
    /// not cleared.
    async fn patch(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
        manifest: &Value,
    ) -> Result<(), ApiError>;

    /// Delete by exact name; an already-absent object is success.
    async fn delete(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ApiError>;

    /// Names of live objects matching an exact label selector.
    async fn list_names(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        label_selector: &str,
    ) -> Result<Vec<String>, ApiError>;

    /// Merge-patch the parent's status subresource.
    async fn patch_parent_status(
        &self,
        namespace: &str,
        name: &str,
        status: &Value,
    ) -> Result<(), ApiError>;

    /// Merge-patch the parent's metadata (finalizer maintenance).
    async fn patch_parent_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), ApiError>;
}

/// Production implementation over a kube [`Client`], using dynamic typing so
/// one code path covers all ten child kinds.
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
    field_manager: String,
}

impl KubeClusterApi {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn dynamic_api(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
    ) -> Api<DynamicObject> {
        let ar = kind.api_resource();
        match namespace {
            Some(ns) if !kind.cluster_scoped() => {
                Api::namespaced_with(self.client.clone(), ns, &ar)
            }
            _ => Api::all_with(self.client.clone(), &ar),
        }
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn get(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<Value>, ApiError> {
        let api = self.dynamic_api(kind, namespace);
        let obj = api.get_opt(name).await?;
        obj.map(serde_json::to_value)
            .transpose()
            .map_err(ApiError::from)
    }

    async fn create(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        manifest: &Value,
    ) -> Result<(), ApiError> {
        let api = self.dynamic_api(kind, namespace);
        let mut obj: DynamicObject = serde_json::from_value(manifest.clone())?;
        obj.types = Some(kube::core::TypeMeta {
            api_version: kind.gvk().api_version(),
            kind: kind.gvk().kind,
        });
        api.create(&PostParams::default(), &obj).await?;
        Ok(())
    }

    async fn patch(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
        manifest: &Value,
    ) -> Result<(), ApiError> {
        let api = self.dynamic_api(kind, namespace);
        let pp = PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        };
        api.patch(name, &pp, &Patch::Merge(manifest)).await?;
        Ok(())
    }

    async fn delete(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ApiError> {
        let api = self.dynamic_api(kind, namespace);
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_names(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        label_selector: &str,
    ) -> Result<Vec<String>, ApiError> {
        let api = self.dynamic_api(kind, namespace);
        let lp = ListParams::default().labels(label_selector);
        let list = api.list(&lp).await?;
        Ok(list.items.iter().map(|o| o.name_any()).collect())
    }

    async fn patch_parent_status(
        &self,
        namespace: &str,
        name: &str,
        status: &Value,
    ) -> Result<(), ApiError> {
        let api: Api<ManagedDeployment> =
            Api::namespaced(self.client.clone(), namespace);
        api.patch_status(
            name,
            &PatchParams::default(),
            &Patch::Merge(status),
        )
        .await?;
        Ok(())
    }

    async fn patch_parent_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), ApiError> {
        let api: Api<ManagedDeployment> =
            Api::namespaced(self.client.clone(), namespace);
        api.patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_scope_is_limited_to_cluster_rbac() {
        for kind in [
            ChildKind::Deployment,
            ChildKind::Service,
            ChildKind::Ingress,
            ChildKind::ServiceAccount,
            ChildKind::Role,
            ChildKind::RoleBinding,
            ChildKind::Secret,
            ChildKind::ConfigMap,
        ] {
            assert!(!kind.cluster_scoped(), "{kind} should be namespaced");
        }
        assert!(ChildKind::ClusterRole.cluster_scoped());
        assert!(ChildKind::ClusterRoleBinding.cluster_scoped());
    }

    #[test]
    fn gvk_covers_expected_groups() {
        assert_eq!(ChildKind::Deployment.gvk().group, "apps");
        assert_eq!(ChildKind::Ingress.gvk().group, "networking.k8s.io");
        assert_eq!(
            ChildKind::ClusterRoleBinding.gvk().group,
            "rbac.authorization.k8s.io"
        );
        assert_eq!(ChildKind::Secret.gvk().group, "");
        assert_eq!(ChildKind::Ingress.plural(), "ingresses");
    }
}

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef,
    Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use super::names;
use crate::crd::managed_deployment::ManagedDeployment;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";
const VERBS: [&str; 7] =
    ["get", "list", "watch", "create", "update", "patch", "delete"];
const CORE_RESOURCES: [&str; 4] =
    ["pods", "services", "endpoints", "persistentvolumeclaims"];

fn verbs() -> Vec<String> {
    VERBS.iter().map(|v| v.to_string()).collect()
}

fn core_rule() -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![String::new()]),
        resources: Some(CORE_RESOURCES.iter().map(|r| r.to_string()).collect()),
        verbs: verbs(),
        ..Default::default()
    }
}

pub fn service_account(parent: &ManagedDeployment) -> ServiceAccount {
    let parent_name = parent.name_any();
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(names::service_account(&parent_name)),
            namespace: parent.namespace(),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn role(parent: &ManagedDeployment) -> Role {
    let parent_name = parent.name_any();
    Role {
        metadata: ObjectMeta {
            name: Some(names::role(&parent_name)),
            namespace: parent.namespace(),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        rules: Some(vec![core_rule()]),
    }
}

/// Cluster-scoped: no namespace, no owner reference. Additionally covers the
/// workload-controller kind.
pub fn cluster_role(parent: &ManagedDeployment) -> ClusterRole {
    let parent_name = parent.name_any();
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(names::cluster_role(&parent_name)),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        rules: Some(vec![
            core_rule(),
            PolicyRule {
                api_groups: Some(vec!["apps".to_string()]),
                resources: Some(vec!["deployments".to_string()]),
                verbs: verbs(),
                ..Default::default()
            },
        ]),
        ..Default::default()
    }
}

pub fn role_binding(parent: &ManagedDeployment) -> RoleBinding {
    let parent_name = parent.name_any();
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(names::role_binding(&parent_name)),
            namespace: parent.namespace(),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        subjects: Some(vec![subject(parent)]),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "Role".to_string(),
            name: names::role(&parent_name),
        },
    }
}

pub fn cluster_role_binding(parent: &ManagedDeployment) -> ClusterRoleBinding {
    let parent_name = parent.name_any();
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(names::cluster_role_binding(&parent_name)),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        subjects: Some(vec![subject(parent)]),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: names::cluster_role(&parent_name),
        },
    }
}

fn subject(parent: &ManagedDeployment) -> Subject {
    Subject {
        kind: "ServiceAccount".to_string(),
        name: names::service_account(&parent.name_any()),
        namespace: parent.namespace(),
        ..Default::default()
    }
}

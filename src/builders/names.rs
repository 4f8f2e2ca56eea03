//! Deterministic child-resource naming and labelling. These names are a
//! compatibility contract with existing deployments and must stay bit-exact.

use std::collections::BTreeMap;

/// Marker label value stamped on every object this operator creates.
pub const MANAGED_BY: &str = "managed-deployment-operator";

/// The workload Deployment shares the parent's bare name.
pub fn workload(parent: &str) -> String {
    parent.to_string()
}

pub fn service_account(parent: &str) -> String {
    format!("{parent}-sa")
}

pub fn role(parent: &str) -> String {
    format!("{parent}-role")
}

pub fn cluster_role(parent: &str) -> String {
    format!("{parent}-clusterrole")
}

pub fn role_binding(parent: &str) -> String {
    format!("{parent}-rolebinding")
}

pub fn cluster_role_binding(parent: &str) -> String {
    format!("{parent}-clusterrolebinding")
}

pub fn secret(parent: &str) -> String {
    format!("{parent}-secret")
}

pub fn config_map(parent: &str) -> String {
    format!("{parent}-configmap")
}

pub fn ingress(parent: &str) -> String {
    format!("{parent}-ingress")
}

/// Labels required on every created object.
pub fn labels(parent: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), parent.to_string()),
        ("managed-by".to_string(), MANAGED_BY.to_string()),
    ])
}

/// Exact label selector matching only this parent's children. Used to
/// enumerate multi-instance categories (Services) without prefix matching.
pub fn owner_selector(parent: &str) -> String {
    format!("app={parent},managed-by={MANAGED_BY}")
}

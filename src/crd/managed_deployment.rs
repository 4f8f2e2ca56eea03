use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declarative description of one managed deployment. Every category toggle
/// is optional; an absent toggle means the category is disabled.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "mdo.example.com",
    version = "v1alpha1",
    kind = "ManagedDeployment",
    plural = "manageddeployments",
    namespaced,
    status = "ManagedDeploymentStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDeploymentSpec {
    /// Master toggle. False or absent tears down every child resource.
    pub enabled: Option<bool>,
    pub rbac_enabled: Option<bool>,
    pub secret_enabled: Option<bool>,
    pub config_map_enabled: Option<bool>,
    pub ingress_enabled: Option<bool>,

    pub replicas: i32,
    pub image: String,
    pub container_port: i32,
    pub resources: ResourcesSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvEntry>,
    pub vol_mount: Option<VolMountSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceEntry>,
    pub ingress: Option<IngressSpec>,
    pub datasource: DatasourceSpec,
}

impl ManagedDeploymentSpec {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
    pub fn rbac_enabled(&self) -> bool {
        self.rbac_enabled.unwrap_or(false)
    }
    pub fn secret_enabled(&self) -> bool {
        self.secret_enabled.unwrap_or(false)
    }
    pub fn config_map_enabled(&self) -> bool {
        self.config_map_enabled.unwrap_or(false)
    }
    pub fn ingress_enabled(&self) -> bool {
        self.ingress_enabled.unwrap_or(false)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
pub struct ResourcesSpec {
    pub limits: ResourceQuantities,
    pub requests: ResourceQuantities,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
pub struct ResourceQuantities {
    pub cpu: String,
    pub memory: String,
}

/// One container environment entry: either a literal `value` or a reference
/// into a Secret key. An entry carrying neither is skipped at build time.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvEntry {
    pub name: String,
    pub value: Option<String>,
    pub value_from: Option<EnvValueFrom>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvValueFrom {
    pub secret_key_ref: Option<SecretKeyRef>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct VolMountSpec {
    pub name: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub name: String,
    pub ports: Vec<ServicePortEntry>,
    /// Defaults to `{app: <parent name>}` when unset.
    pub selector: Option<BTreeMap<String, String>>,
    /// Defaults to `ClusterIP` when unset.
    pub r#type: Option<String>,
    pub session_affinity: Option<String>,
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortEntry {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<i32>,
    pub protocol: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    pub host: Option<String>,
    pub path: Option<String>,
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tls: Vec<IngressTlsEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<IngressRuleEntry>,
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressTlsEntry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    pub secret_name: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct IngressRuleEntry {
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<IngressPathEntry>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressPathEntry {
    pub path: String,
    pub path_type: String,
    pub backend: IngressBackendEntry,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct IngressBackendEntry {
    pub service: IngressBackendService,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct IngressBackendService {
    pub name: String,
    pub port: IngressBackendPort,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct IngressBackendPort {
    pub number: i32,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
pub struct DatasourceSpec {
    pub password: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDeploymentStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub ready: bool,
    /// Empty when the last reconciliation converged cleanly.
    #[serde(default)]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

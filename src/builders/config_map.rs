use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use super::names;
use crate::crd::managed_deployment::ManagedDeployment;

/// ConfigMap with placeholder keyed data. Extension point for real
/// configuration content; the key set is part of the compatibility contract.
pub fn build(parent: &ManagedDeployment) -> ConfigMap {
    let parent_name = parent.name_any();
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(names::config_map(&parent_name)),
            namespace: parent.namespace(),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            "config-file-name".to_string(),
            "config-file-content".to_string(),
        )])),
        ..Default::default()
    }
}

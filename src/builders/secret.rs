use std::collections::BTreeMap;

use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use super::names;
use crate::crd::managed_deployment::ManagedDeployment;

/// Datasource password key inside the Secret.
pub const PASSWORD_KEY: &str = "database-password";

/// Secret holding the datasource password. `ByteString` base64-encodes the
/// value on the wire, as the cluster API requires for `data`.
pub fn build(parent: &ManagedDeployment) -> Secret {
    let parent_name = parent.name_any();
    Secret {
        metadata: ObjectMeta {
            name: Some(names::secret(&parent_name)),
            namespace: parent.namespace(),
            labels: Some(names::labels(&parent_name)),
            ..Default::default()
        },
        type_: Some("Opaque".to_string()),
        data: Some(BTreeMap::from([(
            PASSWORD_KEY.to_string(),
            ByteString(parent.spec.datasource.password.clone().into_bytes()),
        )])),
        ..Default::default()
    }
}

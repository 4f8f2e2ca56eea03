use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    ObjectMeta, OwnerReference,
};
use kube::{Resource, ResourceExt};

use crate::crd::managed_deployment::ManagedDeployment;

/// Back-reference from a child to its parent. `controller` and
/// `blockOwnerDeletion` are set so the garbage collector cascades a parent
/// delete onto every namespace-scoped child.
pub fn owner_reference(parent: &ManagedDeployment) -> Option<OwnerReference> {
    parent.meta().uid.as_ref().map(|uid| OwnerReference {
        api_version: ManagedDeployment::api_version(&()).to_string(),
        kind: ManagedDeployment::kind(&()).to_string(),
        name: parent.name_any(),
        uid: uid.clone(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// Stamp the parent's owner reference onto a namespace-scoped child. Must not
/// be called for cluster-scoped objects: the parent is namespaced and cascade
/// deletion does not span scopes, so those are deleted explicitly instead.
pub fn attach(meta: &mut ObjectMeta, parent: &ManagedDeployment) {
    if let Some(or) = owner_reference(parent) {
        meta.owner_references = Some(vec![or]);
    }
}

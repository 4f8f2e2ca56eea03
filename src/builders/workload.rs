use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, EnvVar, EnvVarSource,
    PodSpec, PodTemplateSpec, ResourceRequirements, SecretKeySelector, Volume,
    VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    LabelSelector, ObjectMeta,
};
use kube::ResourceExt;
use tracing::warn;

use super::{BuildError, names, probes};
use crate::crd::managed_deployment::{EnvEntry, ManagedDeployment};

/// Build the workload Deployment. This is the one mandatory child: it exists
/// whenever the master toggle is on, regardless of category toggles.
pub fn build(parent: &ManagedDeployment) -> Result<Deployment, BuildError> {
    let name = parent.name_any();
    let spec = &parent.spec;
    let labels = names::labels(&name);

    let mut container = Container {
        name: name.clone(),
        image: Some(spec.image.clone()),
        ports: Some(vec![ContainerPort {
            container_port: spec.container_port,
            ..Default::default()
        }]),
        env: Some(env_vars(&spec.environment)),
        resources: Some(resource_requirements(parent)),
        liveness_probe: Some(probes::liveness(spec.container_port)),
        readiness_probe: Some(probes::readiness(spec.container_port)),
        ..Default::default()
    };

    let mut volumes: Option<Vec<Volume>> = None;
    if let Some(vm) = &spec.vol_mount {
        if vm.enabled.unwrap_or(false) {
            let vol_name = vm
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .ok_or(BuildError::VolumeMountMissingName)?;
            container.volume_mounts = Some(vec![VolumeMount {
                name: vol_name.clone(),
                mount_path: "/config".to_string(),
                ..Default::default()
            }]);
            volumes = Some(vec![Volume {
                name: vol_name.clone(),
                config_map: Some(ConfigMapVolumeSource {
                    name: vol_name,
                    ..Default::default()
                }),
                ..Default::default()
            }]);
        }
    }

    Ok(Deployment {
        metadata: ObjectMeta {
            name: Some(names::workload(&name)),
            namespace: parent.namespace(),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(spec.replicas),
            selector: LabelSelector {
                match_labels: Some(BTreeMap::from([(
                    "app".to_string(),
                    name.clone(),
                )])),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Map spec environment entries to container env vars. An entry with neither
/// a literal value nor a secret reference is skipped with a warning; it never
/// aborts the build.
fn env_vars(entries: &[EnvEntry]) -> Vec<EnvVar> {
    entries
        .iter()
        .filter_map(|entry| {
            if let Some(value) = &entry.value {
                return Some(EnvVar {
                    name: entry.name.clone(),
                    value: Some(value.clone()),
                    ..Default::default()
                });
            }
            if let Some(sk) =
                entry.value_from.as_ref().and_then(|v| v.secret_key_ref.as_ref())
            {
                return Some(EnvVar {
                    name: entry.name.clone(),
                    value_from: Some(EnvVarSource {
                        secret_key_ref: Some(SecretKeySelector {
                            name: sk.name.clone(),
                            key: sk.key.clone(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                });
            }
            warn!(
                env = %entry.name,
                "environment entry has neither value nor secretKeyRef; skipping"
            );
            None
        })
        .collect()
}

fn resource_requirements(parent: &ManagedDeployment) -> ResourceRequirements {
    let res = &parent.spec.resources;
    let quantities = |cpu: &str, memory: &str| {
        BTreeMap::from([
            ("cpu".to_string(), Quantity(cpu.to_string())),
            ("memory".to_string(), Quantity(memory.to_string())),
        ])
    };
    ResourceRequirements {
        limits: Some(quantities(&res.limits.cpu, &res.limits.memory)),
        requests: Some(quantities(&res.requests.cpu, &res.requests.memory)),
        ..Default::default()
    }
}

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use managed_deployment_operator::cluster::{ApiError, ChildKind, ClusterApi};
use managed_deployment_operator::config::OperatorConfig;
use managed_deployment_operator::controller::ControllerContext;
use managed_deployment_operator::crd::managed_deployment::{
    ManagedDeployment, ManagedDeploymentSpec,
};

pub type ObjectKey = (ChildKind, Option<String>, String);

#[derive(Default)]
pub struct FakeState {
    pub objects: BTreeMap<ObjectKey, Value>,
    pub creates: usize,
    pub patches: usize,
    pub deletes: usize,
    pub status_patches: Vec<Value>,
    pub metadata_patches: Vec<Value>,
}

/// In-memory stand-in for the cluster API. Stores manifests keyed by
/// kind/namespace/name, counts mutating calls, and can inject failures for a
/// chosen kind or for status writes.
#[derive(Default)]
pub struct FakeClusterApi {
    pub state: Mutex<FakeState>,
    pub fail_on_kind: Option<ChildKind>,
    pub fail_status_writes: bool,
}

impl FakeClusterApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(kind: ChildKind) -> Arc<Self> {
        Arc::new(Self {
            fail_on_kind: Some(kind),
            ..Default::default()
        })
    }

    pub fn with_failing_status_writes() -> Arc<Self> {
        Arc::new(Self {
            fail_status_writes: true,
            ..Default::default()
        })
    }

    pub fn object_names(&self, kind: ChildKind) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, name)| name.clone())
            .collect()
    }

    pub fn object(&self, kind: ChildKind, name: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .find(|((k, _, n), _)| *k == kind && n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn snapshot(&self) -> BTreeMap<ObjectKey, Value> {
        self.state.lock().unwrap().objects.clone()
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn last_status(&self) -> Option<Value> {
        self.state.lock().unwrap().status_patches.last().cloned()
    }

    pub fn metadata_patches(&self) -> Vec<Value> {
        self.state.lock().unwrap().metadata_patches.clone()
    }

    fn check_failure(&self, kind: ChildKind) -> Result<(), ApiError> {
        if self.fail_on_kind == Some(kind) {
            return Err(ApiError::Other(format!("injected failure for {kind}")));
        }
        Ok(())
    }

    fn key(
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> ObjectKey {
        let ns = if kind.cluster_scoped() {
            None
        } else {
            namespace.map(String::from)
        };
        (kind, ns, name.to_string())
    }
}

#[async_trait]
impl ClusterApi for FakeClusterApi {
    async fn get(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<Value>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state.objects.get(&Self::key(kind, namespace, name)).cloned())
    }

    async fn create(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        manifest: &Value,
    ) -> Result<(), ApiError> {
        self.check_failure(kind)?;
        let name = manifest["metadata"]["name"]
            .as_str()
            .ok_or_else(|| ApiError::Other("manifest without name".into()))?
            .to_string();
        let mut state = self.state.lock().unwrap();
        let key = Self::key(kind, namespace, &name);
        if state.objects.contains_key(&key) {
            return Err(ApiError::Other(format!("{kind}/{name} already exists")));
        }
        state.objects.insert(key, manifest.clone());
        state.creates += 1;
        Ok(())
    }

    async fn patch(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
        manifest: &Value,
    ) -> Result<(), ApiError> {
        self.check_failure(kind)?;
        let mut state = self.state.lock().unwrap();
        let key = Self::key(kind, namespace, name);
        match state.objects.get_mut(&key) {
            Some(existing) => {
                *existing = manifest.clone();
                state.patches += 1;
                Ok(())
            }
            None => Err(ApiError::Other(format!("{kind}/{name} not found"))),
        }
    }

    async fn delete(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ApiError> {
        self.check_failure(kind)?;
        let mut state = self.state.lock().unwrap();
        let key = Self::key(kind, namespace, name);
        if state.objects.remove(&key).is_some() {
            state.deletes += 1;
        }
        Ok(())
    }

    async fn list_names(
        &self,
        kind: ChildKind,
        namespace: Option<&str>,
        label_selector: &str,
    ) -> Result<Vec<String>, ApiError> {
        let wanted: Vec<(&str, &str)> = label_selector
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        let state = self.state.lock().unwrap();
        let ns = namespace.map(String::from);
        Ok(state
            .objects
            .iter()
            .filter(|((k, obj_ns, _), _)| *k == kind && *obj_ns == ns)
            .filter(|(_, manifest)| {
                let labels = &manifest["metadata"]["labels"];
                wanted
                    .iter()
                    .all(|(k, v)| labels[*k].as_str() == Some(*v))
            })
            .map(|((_, _, name), _)| name.clone())
            .collect())
    }

    async fn patch_parent_status(
        &self,
        _namespace: &str,
        _name: &str,
        status: &Value,
    ) -> Result<(), ApiError> {
        if self.fail_status_writes {
            return Err(ApiError::Other("injected status write failure".into()));
        }
        self.state
            .lock()
            .unwrap()
            .status_patches
            .push(status.clone());
        Ok(())
    }

    async fn patch_parent_metadata(
        &self,
        _namespace: &str,
        _name: &str,
        patch: &Value,
    ) -> Result<(), ApiError> {
        self.state
            .lock()
            .unwrap()
            .metadata_patches
            .push(patch.clone());
        Ok(())
    }
}

pub fn context(api: Arc<FakeClusterApi>) -> Arc<ControllerContext> {
    Arc::new(ControllerContext {
        api,
        cfg: OperatorConfig::default(),
        recorder: None,
    })
}

/// Spec with every category enabled, one declared Service and an Ingress.
pub fn full_spec() -> serde_json::Value {
    serde_json::json!({
        "enabled": true,
        "rbacEnabled": true,
        "secretEnabled": true,
        "configMapEnabled": true,
        "ingressEnabled": true,
        "replicas": 2,
        "image": "svc:1.0",
        "containerPort": 8080,
        "resources": {
            "limits": {"cpu": "500m", "memory": "512Mi"},
            "requests": {"cpu": "250m", "memory": "256Mi"}
        },
        "environment": [
            {"name": "LOG_LEVEL", "value": "info"},
            {"name": "DB_PASSWORD", "valueFrom": {
                "secretKeyRef": {"name": "orders-svc-secret", "key": "database-password"}
            }}
        ],
        "services": [
            {"name": "orders-svc-http", "ports": [
                {"name": "http", "port": 80, "targetPort": 8080, "protocol": "TCP"}
            ]}
        ],
        "ingress": {
            "className": "nginx",
            "tls": [{"hosts": ["orders.example.com"], "secretName": "orders-tls"}],
            "rules": [{
                "host": "orders.example.com",
                "paths": [{
                    "path": "/",
                    "pathType": "Prefix",
                    "backend": {"service": {"name": "orders-svc-http", "port": {"number": 80}}}
                }]
            }]
        },
        "datasource": {"password": "s3cret"}
    })
}

pub fn parent(name: &str, spec: serde_json::Value) -> Arc<ManagedDeployment> {
    let spec: ManagedDeploymentSpec =
        serde_json::from_value(spec).expect("test spec parses");
    let mut md = ManagedDeployment::new(name, spec);
    md.metadata.namespace = Some("default".to_string());
    md.metadata.uid = Some(format!("uid-{name}"));
    Arc::new(md)
}

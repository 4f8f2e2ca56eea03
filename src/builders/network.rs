use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend,
    IngressRule, IngressServiceBackend, IngressSpec, IngressTLS,
    ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

use super::names;
use crate::crd::managed_deployment::ManagedDeployment;

/// One Service document per declared service entry. Service names come from
/// the spec, not from the parent, so the deletion engine finds them by label
/// rather than by deterministic suffix.
pub fn build_services(parent: &ManagedDeployment) -> Vec<Service> {
    let parent_name = parent.name_any();
    parent
        .spec
        .services
        .iter()
        .map(|entry| {
            let ports = entry
                .ports
                .iter()
                .map(|p| ServicePort {
                    name: p.name.clone(),
                    port: p.port,
                    target_port: Some(IntOrString::Int(
                        p.target_port.unwrap_or(p.port),
                    )),
                    protocol: p.protocol.clone(),
                    ..Default::default()
                })
                .collect();
            let selector = entry.selector.clone().unwrap_or_else(|| {
                BTreeMap::from([("app".to_string(), parent_name.clone())])
            });
            Service {
                metadata: ObjectMeta {
                    name: Some(entry.name.clone()),
                    namespace: parent.namespace(),
                    labels: Some(names::labels(&parent_name)),
                    annotations: entry.annotations.clone(),
                    ..Default::default()
                },
                spec: Some(ServiceSpec {
                    selector: Some(selector),
                    ports: Some(ports),
                    type_: Some(
                        entry
                            .r#type
                            .clone()
                            .unwrap_or_else(|| "ClusterIP".to_string()),
                    ),
                    session_affinity: entry.session_affinity.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }
        })
        .collect()
}

/// The Ingress document, when the spec declares one. Host/path rules and TLS
/// entries map 1:1 from the spec.
pub fn build_ingress(parent: &ManagedDeployment) -> Option<Ingress> {
    let parent_name = parent.name_any();
    let ing = parent.spec.ingress.as_ref()?;

    let tls: Vec<IngressTLS> = ing
        .tls
        .iter()
        .map(|t| IngressTLS {
            hosts: (!t.hosts.is_empty()).then(|| t.hosts.clone()),
            secret_name: t.secret_name.clone(),
        })
        .collect();

    let rules: Vec<IngressRule> = ing
        .rules
        .iter()
        .map(|rule| IngressRule {
            host: rule.host.clone(),
            http: Some(HTTPIngressRuleValue {
                paths: rule
                    .paths
                    .iter()
                    .map(|p| HTTPIngressPath {
                        path: Some(p.path.clone()),
                        path_type: p.path_type.clone(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: p.backend.service.name.clone(),
                                port: Some(ServiceBackendPort {
                                    number: Some(p.backend.service.port.number),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    })
                    .collect(),
            }),
        })
        .collect();

    Some(Ingress {
        metadata: ObjectMeta {
            name: Some(names::ingress(&parent_name)),
            namespace: parent.namespace(),
            labels: Some(names::labels(&parent_name)),
            annotations: ing.annotations.clone(),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: ing.class_name.clone(),
            tls: (!tls.is_empty()).then_some(tls),
            rules: (!rules.is_empty()).then_some(rules),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::managed_deployment::ManagedDeploymentSpec;

    fn parent(spec: serde_json::Value) -> ManagedDeployment {
        ManagedDeployment::new(
            "orders-svc",
            serde_json::from_value::<ManagedDeploymentSpec>(spec).unwrap(),
        )
    }

    fn base_spec() -> serde_json::Value {
        serde_json::json!({
            "enabled": true,
            "ingressEnabled": true,
            "replicas": 1,
            "image": "svc:1.0",
            "containerPort": 8080,
            "resources": {
                "limits": {"cpu": "500m", "memory": "512Mi"},
                "requests": {"cpu": "250m", "memory": "256Mi"}
            },
            "datasource": {"password": "pw"}
        })
    }

    #[test]
    fn service_defaults_selector_and_type() {
        let mut spec = base_spec();
        spec["services"] = serde_json::json!([
            {"name": "orders-svc-http", "ports": [{"name": "http", "port": 80, "targetPort": 8080}]}
        ]);
        let services = build_services(&parent(spec));
        assert_eq!(services.len(), 1);
        let svc = &services[0];
        assert_eq!(svc.metadata.name.as_deref(), Some("orders-svc-http"));
        let s = svc.spec.as_ref().unwrap();
        assert_eq!(s.type_.as_deref(), Some("ClusterIP"));
        assert_eq!(
            s.selector.as_ref().unwrap().get("app").map(String::as_str),
            Some("orders-svc")
        );
        let port = &s.ports.as_ref().unwrap()[0];
        assert_eq!(port.port, 80);
        assert_eq!(port.target_port, Some(IntOrString::Int(8080)));
    }

    #[test]
    fn service_target_port_falls_back_to_port() {
        let mut spec = base_spec();
        spec["services"] = serde_json::json!([
            {"name": "plain", "ports": [{"port": 9090}]}
        ]);
        let services = build_services(&parent(spec));
        let port = &services[0].spec.as_ref().unwrap().ports.as_ref().unwrap()[0];
        assert_eq!(port.target_port, Some(IntOrString::Int(9090)));
    }

    #[test]
    fn ingress_maps_rules_and_tls_one_to_one() {
        let mut spec = base_spec();
        spec["ingress"] = serde_json::json!({
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
        });
        let ing = build_ingress(&parent(spec)).expect("ingress document");
        assert_eq!(ing.metadata.name.as_deref(), Some("orders-svc-ingress"));
        let s = ing.spec.unwrap();
        assert_eq!(s.ingress_class_name.as_deref(), Some("nginx"));
        assert_eq!(s.tls.as_ref().unwrap().len(), 1);
        let rule = &s.rules.as_ref().unwrap()[0];
        assert_eq!(rule.host.as_deref(), Some("orders.example.com"));
        let path = &rule.http.as_ref().unwrap().paths[0];
        assert_eq!(path.path_type, "Prefix");
        let backend = path.backend.service.as_ref().unwrap();
        assert_eq!(backend.name, "orders-svc-http");
        assert_eq!(backend.port.as_ref().unwrap().number, Some(80));
    }

    #[test]
    fn no_ingress_document_without_spec() {
        assert!(build_ingress(&parent(base_spec())).is_none());
    }
}

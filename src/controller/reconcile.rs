use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use serde_json::json;
use tracing::{debug, info, instrument};

use super::apply::converge_typed;
use super::deletion::{self, Category};
use super::events::{self, REASON_CONVERGED};
use super::status::{self, Outcome};
use super::{ControllerContext, ReconcileError};
use crate::builders::{
    config_map, names, network, owner, rbac, secret, workload,
};
use crate::cluster::ChildKind;
use crate::crd::managed_deployment::ManagedDeployment;

const FINALIZER: &str = "mdo.example.com/finalizer";

#[instrument(skip_all, fields(ns = %obj.namespace().unwrap_or_else(|| "default".into()), name = %obj.name_any()))]
pub async fn reconcile(
    obj: Arc<ManagedDeployment>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileError> {
    let ns = obj.namespace().unwrap_or_else(|| "default".to_string());
    let name = obj.name_any();
    let uid = obj.meta().uid.clone();
    let api = ctx.api.as_ref();

    // Parent is going away. Cascade GC removes the namespaced children, but
    // the cluster-scoped RBAC pair is out of its reach; delete everything
    // explicitly before releasing the finalizer.
    if obj.meta().deletion_timestamp.is_some() {
        info!("deletion timestamp detected; cleaning up children");
        deletion::delete_all(api, &ns, &name).await?;
        remove_finalizer(&obj, &ctx, &ns, &name).await?;
        return Ok(Action::await_change());
    }

    ensure_finalizer(&obj, &ctx, &ns, &name).await?;

    match run(&obj, &ctx, &ns, &name).await {
        Ok(outcome) => {
            let converged = matches!(outcome, Outcome::Converged { .. });
            status::report(api, &ns, &name, outcome).await;
            if converged {
                if let Some(recorder) = &ctx.recorder {
                    events::emit_event(
                        recorder,
                        &ns,
                        &name,
                        uid.as_deref(),
                        REASON_CONVERGED,
                        "Apply",
                        Some(format!("Converged children of {name}")),
                    )
                    .await;
                }
            }
            Ok(Action::requeue(Duration::from_secs(ctx.cfg.requeue_secs)))
        }
        Err(e) => {
            // Single error boundary: no rollback of steps already applied;
            // the next invocation converges forward.
            status::report(
                api,
                &ns,
                &name,
                Outcome::Errored {
                    image: obj.spec.image.clone(),
                    cause: e.to_string(),
                },
            )
            .await;
            Err(e)
        }
    }
}

/// One convergence pass. Categories run in a fixed order so identity and
/// configuration exist before the workload that references them; the workload
/// itself has no toggle and is always converged last.
async fn run(
    obj: &ManagedDeployment,
    ctx: &ControllerContext,
    ns: &str,
    name: &str,
) -> Result<Outcome, ReconcileError> {
    let api = ctx.api.as_ref();
    let spec = &obj.spec;

    if !spec.enabled() {
        info!("deployment disabled; deleting all child resources");
        deletion::delete_all(api, ns, name).await?;
        return Ok(Outcome::Disabled);
    }

    debug!(?spec, "reconciling enabled deployment");

    if !spec.rbac_enabled() {
        deletion::delete_category(api, Category::Rbac, ns, name).await?;
    } else {
        let mut sa = rbac::service_account(obj);
        owner::attach(&mut sa.metadata, obj);
        converge_typed(api, ChildKind::ServiceAccount, &sa).await?;

        // Cluster-scoped: applied without an owner reference.
        let cr = rbac::cluster_role(obj);
        converge_typed(api, ChildKind::ClusterRole, &cr).await?;
        let crb = rbac::cluster_role_binding(obj);
        converge_typed(api, ChildKind::ClusterRoleBinding, &crb).await?;

        let mut role = rbac::role(obj);
        owner::attach(&mut role.metadata, obj);
        converge_typed(api, ChildKind::Role, &role).await?;
        let mut rb = rbac::role_binding(obj);
        owner::attach(&mut rb.metadata, obj);
        converge_typed(api, ChildKind::RoleBinding, &rb).await?;
    }

    if !spec.secret_enabled() {
        deletion::delete_category(api, Category::Secret, ns, name).await?;
    } else {
        let mut sec = secret::build(obj);
        owner::attach(&mut sec.metadata, obj);
        converge_typed(api, ChildKind::Secret, &sec).await?;
    }

    if !spec.config_map_enabled() {
        deletion::delete_category(api, Category::ConfigMap, ns, name).await?;
    } else {
        let mut cm = config_map::build(obj);
        owner::attach(&mut cm.metadata, obj);
        converge_typed(api, ChildKind::ConfigMap, &cm).await?;
    }

    if !spec.ingress_enabled() {
        deletion::delete_category(api, Category::Network, ns, name).await?;
    } else {
        match network::build_ingress(obj) {
            Some(mut ing) => {
                owner::attach(&mut ing.metadata, obj);
                converge_typed(api, ChildKind::Ingress, &ing).await?;
            }
            // Toggle on but no ingress declared: make sure no stale document
            // lingers under the deterministic name.
            None => {
                api.delete(
                    ChildKind::Ingress,
                    Some(ns),
                    &names::ingress(name),
                )
                .await?;
            }
        }
        for mut svc in network::build_services(obj) {
            owner::attach(&mut svc.metadata, obj);
            converge_typed(api, ChildKind::Service, &svc).await?;
        }
    }

    let mut dep = workload::build(obj)?;
    owner::attach(&mut dep.metadata, obj);
    converge_typed(api, ChildKind::Deployment, &dep).await?;

    Ok(Outcome::Converged {
        replicas: spec.replicas,
        image: spec.image.clone(),
    })
}

async fn ensure_finalizer(
    obj: &ManagedDeployment,
    ctx: &ControllerContext,
    ns: &str,
    name: &str,
) -> Result<(), ReconcileError> {
    let present = obj
        .meta()
        .finalizers
        .as_ref()
        .map(|f| f.iter().any(|x| x == FINALIZER))
        .unwrap_or(false);
    if present {
        return Ok(());
    }
    let mut finals = obj.meta().finalizers.clone().unwrap_or_default();
    finals.push(FINALIZER.to_string());
    let patch = json!({"metadata": {"finalizers": finals}});
    ctx.api.patch_parent_metadata(ns, name, &patch).await?;
    Ok(())
}

async fn remove_finalizer(
    obj: &ManagedDeployment,
    ctx: &ControllerContext,
    ns: &str,
    name: &str,
) -> Result<(), ReconcileError> {
    let present = obj
        .meta()
        .finalizers
        .as_ref()
        .map(|f| f.iter().any(|x| x == FINALIZER))
        .unwrap_or(false);
    if !present {
        return Ok(());
    }
    let finals: Vec<String> = obj
        .meta()
        .finalizers
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter(|f| f != FINALIZER)
        .collect();
    let patch = json!({"metadata": {"finalizers": finals}});
    ctx.api.patch_parent_metadata(ns, name, &patch).await?;
    Ok(())
}

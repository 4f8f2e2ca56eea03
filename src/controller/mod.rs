pub mod apply;
pub mod deletion;
pub mod events;
pub mod reconcile;
pub mod status;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use kube::runtime::events::{Recorder, Reporter};
use kube::runtime::{Controller, controller::Action, watcher};
use kube::{Api, Client};
use tracing::{error, info};

use crate::builders::BuildError;
use crate::cluster::{ApiError, ClusterApi, KubeClusterApi};
use crate::config::OperatorConfig;
use crate::crd::managed_deployment::ManagedDeployment;

/// Every reconciliation step reports one of two failure classes: a spec that
/// cannot produce a well-formed document, or a cluster API call that failed.
/// Neither is retried here; the hosting controller's requeue is the retry.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("infrastructure error: {0}")]
    Infra(String),
}

impl From<ApiError> for ReconcileError {
    fn from(e: ApiError) -> Self {
        Self::Infra(e.to_string())
    }
}

impl From<BuildError> for ReconcileError {
    fn from(e: BuildError) -> Self {
        Self::Config(e.to_string())
    }
}

pub struct ControllerContext {
    pub api: Arc<dyn ClusterApi>,
    pub cfg: OperatorConfig,
    pub recorder: Option<Recorder>,
}

pub async fn run_controller(
    client: Client,
    cfg: OperatorConfig,
) -> anyhow::Result<()> {
    let parents: Api<ManagedDeployment> = Api::all(client.clone());
    let recorder = Recorder::new(
        client.clone(),
        Reporter {
            controller: cfg.field_manager.clone(),
            instance: None,
        },
    );
    let ctx = Arc::new(ControllerContext {
        api: Arc::new(KubeClusterApi::new(client, cfg.field_manager.clone())),
        cfg,
        recorder: Some(recorder),
    });

    Controller::new(parents, watcher::Config::default())
        .run(reconcile::reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((_obj_ref, action)) => {
                    info!("reconciled: requeue={:?}", action)
                }
                Err(e) => error!(error = ?e, "reconcile error"),
            }
        })
        .await;

    Ok(())
}

fn error_policy(
    _obj: Arc<ManagedDeployment>,
    _error: &ReconcileError,
    ctx: Arc<ControllerContext>,
) -> Action {
    Action::requeue(Duration::from_secs(ctx.cfg.error_requeue_secs))
}

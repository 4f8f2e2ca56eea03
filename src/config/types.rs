use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct OperatorConfig {
    /// Requeue interval after a successful reconciliation.
    /// Env: MDO_REQUEUE_SECS
    #[envconfig(from = "MDO_REQUEUE_SECS", default = "300")]
    pub requeue_secs: u64,

    /// Requeue interval after a failed reconciliation.
    /// Env: MDO_ERROR_REQUEUE_SECS
    #[envconfig(from = "MDO_ERROR_REQUEUE_SECS", default = "60")]
    pub error_requeue_secs: u64,

    /// Field manager name used for patches issued by this operator.
    /// Env: MDO_FIELD_MANAGER
    #[envconfig(from = "MDO_FIELD_MANAGER", default = "managed-deployment-operator")]
    pub field_manager: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            requeue_secs: 300,
            error_requeue_secs: 60,
            field_manager: "managed-deployment-operator".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = OperatorConfig::default();
        assert_eq!(cfg.requeue_secs, 300);
        assert_eq!(cfg.error_requeue_secs, 60);
        assert_eq!(cfg.field_manager, "managed-deployment-operator");
    }
}

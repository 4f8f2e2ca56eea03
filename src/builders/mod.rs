//! Desired-state builders: pure functions from `(spec, parent identity)` to a
//! fully-populated resource document. No I/O happens here; the apply engine
//! owns all cluster traffic.

pub mod config_map;
pub mod names;
pub mod network;
pub mod owner;
pub mod probes;
pub mod rbac;
pub mod secret;
pub mod workload;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("volume mount is enabled but carries no name")]
    VolumeMountMissingName,
}

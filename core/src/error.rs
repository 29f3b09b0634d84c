use netready_common::network::InterfaceType;
use thiserror::Error;

/// Failures the coordinator raises to its caller.
///
/// Cancellation and unexpected faults are not errors here; they surface
/// through [`ReadinessState`](crate::readiness::ReadinessState) and
/// [`last_error`](crate::readiness::ReadinessCoordinator::last_error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessError {
    /// Setup was already called on this coordinator.
    #[error("network setup was already requested on this coordinator; call reset() before setting it up again")]
    AlreadySetUp,

    /// The device exposes no interface of the target type.
    #[error("no {target} interface available ({found} interface(s) present)")]
    NoInterface { target: InterfaceType, found: usize },
}

use derivative::Derivative;
use derive_setters::Setters;

/// How a known method with malformed arguments is answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidArgumentPolicy {
    /// Acknowledge with `true` and emit nothing. The command is dropped and
    /// a warning is logged.
    #[default]
    Acknowledge,
    /// Reply with [`MethodResult::Error`](crate::MethodResult::Error) and
    /// emit an `onError` event.
    Reject,
}

/// Configuration for [`PlayerService`](crate::PlayerService).
#[derive(Clone, Debug, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct BridgeConfig {
    pub invalid_arguments: InvalidArgumentPolicy,
    /// Pending host calls before [`PlayerHandle`](crate::PlayerHandle)
    /// callers wait. Default: 32.
    #[derivative(Default(value = "32"))]
    pub call_capacity: usize,
}

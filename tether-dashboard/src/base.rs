use crate::SessionOptions;
use anyhow::Result;
use serde_json::Value;
use tether_core::record::RecordValue;

/// A remote service aggregating metrics of training runs.
pub trait Dashboard {
    /// The session type opened by this dashboard.
    type Session: DashboardSession;

    /// Opens a session, logging `config` (hyperparameters and other metadata)
    /// once at its start. `options` is forwarded as given.
    fn init_session(&self, config: &Value, options: &SessionOptions) -> Result<Self::Session>;
}

/// A logging context on a [`Dashboard`], aggregating metrics keyed by step.
pub trait DashboardSession {
    /// Logs `value` under `key` at `step`.
    fn log_metric(&mut self, key: &str, value: &RecordValue, step: u64) -> Result<()>;

    /// Finalizes the session.
    fn finish(&mut self) -> Result<()>;
}

use crate::{Dashboard, DashboardSession, SessionOptions};
use anyhow::Result;
use log::{info, trace, warn};
use serde::Serialize;
use tether_core::{
    error::TetherError,
    writer::{KeyValues, KvWriter},
};

/// Name of this output format. Values whose [`Exclusion`] contains it are not
/// forwarded.
///
/// [`Exclusion`]: tether_core::writer::Exclusion
pub const FORMAT_NAME: &str = "wandb";

/// A [`KvWriter`] forwarding values to a dashboard session.
///
/// The session is opened in [`DashboardOutputFormat::new`] and lives until
/// [`KvWriter::close`] is called or the writer is dropped.
pub struct DashboardOutputFormat<S: DashboardSession> {
    session: Option<S>,
}

impl<S: DashboardSession> DashboardOutputFormat<S> {
    /// Opens a session on `dashboard` with `options`, logging `config` once.
    pub fn new<D>(dashboard: &D, options: &SessionOptions, config: impl Serialize) -> Result<Self>
    where
        D: Dashboard<Session = S>,
    {
        let config = serde_json::to_value(config)?;
        let session = dashboard.init_session(&config, options)?;
        info!(
            "Opened dashboard session for experiment '{}'",
            options.experiment
        );

        Ok(Self {
            session: Some(session),
        })
    }

    /// Returns `true` until the session is closed.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }
}

impl<S: DashboardSession> KvWriter for DashboardOutputFormat<S> {
    /// Forwards, in key order, each value not excluded from [`FORMAT_NAME`] to
    /// the session at `step`.
    ///
    /// Errors of the session are returned as they are, values after the failing
    /// one are not forwarded.
    fn write(&mut self, key_values: &KeyValues, step: u64) -> Result<()> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                return Err(
                    TetherError::InvariantError("write to a closed session".to_string()).into(),
                )
            }
        };

        for (key, value) in key_values.included(FORMAT_NAME) {
            trace!("Forward '{}' at step {}", key, step);
            session.log_metric(key, value, step)?;
        }

        Ok(())
    }

    /// Finishes the session. Calling this method again does nothing.
    fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            session.finish()?;
            info!("Closed dashboard session");
        }
        Ok(())
    }
}

impl<S: DashboardSession> Drop for DashboardOutputFormat<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close dashboard session: {}", e);
        }
    }
}

use crate::{client::Api, DashboardSession, Run};
use anyhow::Result;
use chrono::{DateTime, Duration, Local, SecondsFormat};
use log::{debug, info, trace};
use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, convert::TryFrom};
use tether_core::{error::TetherError, record::RecordValue};

#[derive(Debug, Serialize)]
struct LogParamParams<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct LogMetricParams<'a> {
    run_id: &'a str,
    key: &'a str,
    value: f64,
    timestamp: i64,
    step: i64,
}

#[derive(Debug, Serialize)]
struct UpdateRunParams<'a> {
    run_id: &'a str,
    status: &'a str,
    end_time: i64,
    run_name: &'a str,
}

#[derive(Debug, Serialize)]
struct SetTagParams<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

/// A run on the MLflow tracking server, created by
/// [`TrackingClient`](crate::TrackingClient).
///
/// [`RecordValue::Scalar`] values are logged as metrics
/// (<https://mlflow.org/docs/latest/rest-api.html#metric>) and
/// [`RecordValue::String`] values as run tags. Other types of values are ignored.
///
/// The session sets tag `host_start_time` at its start, and `host_end_time` and
/// `host_duration` at [`DashboardSession::finish`], which also updates the run's
/// status to "FINISHED".
pub struct TrackingSession {
    api: Api,
    experiment_id: String,
    run_id: String,
    run_name: String,
    start_time: DateTime<Local>,
    finished: bool,
}

impl TrackingSession {
    pub(crate) fn new(api: Api, run: &Run) -> Result<Self> {
        let start_time = Local::now();
        let session = Self {
            api,
            experiment_id: run.info.experiment_id.clone(),
            run_id: run.info.run_id.clone(),
            run_name: run.info.run_name.clone(),
            start_time,
            finished: false,
        };
        session.set_tag(
            "host_start_time",
            start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        info!(
            "Started run '{}' ({}) in experiment {}",
            session.run_name, session.run_id, session.experiment_id
        );

        Ok(session)
    }

    /// ID of the run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Name of the run.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Logs `params` as parameters of the run.
    ///
    /// Nested objects are flattened, logged like `hyper_params.param1`.
    pub fn log_params(&self, params: &Value) -> Result<()> {
        for (key, value) in flatten(params)?.iter() {
            self.api.post(
                "runs/log-parameter",
                &LogParamParams {
                    run_id: &self.run_id,
                    key,
                    value,
                },
            )?;
        }
        Ok(())
    }

    /// Sets a tag on the run.
    pub fn set_tag(&self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
        self.api.post(
            "runs/set-tag",
            &SetTagParams {
                run_id: &self.run_id,
                key: key.as_ref(),
                value: value.as_ref(),
            },
        )?;
        Ok(())
    }
}

impl DashboardSession for TrackingSession {
    fn log_metric(&mut self, key: &str, value: &RecordValue, step: u64) -> Result<()> {
        match value {
            RecordValue::Scalar(v) => {
                self.api.post(
                    "runs/log-metric",
                    &LogMetricParams {
                        run_id: &self.run_id,
                        key,
                        value: *v as f64,
                        timestamp: Local::now().timestamp_millis(),
                        step: i64::try_from(step)?,
                    },
                )?;
                trace!("Logged {}={} at step {}", key, v, step);
            }
            RecordValue::String(s) => self.set_tag(key, s)?,
            _ => debug!("Ignored non-scalar value of '{}'", key),
        }
        Ok(())
    }

    /// Sets tags `host_end_time` and `host_duration`, then updates the run's
    /// status to "FINISHED". Calling this method again does nothing.
    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let end_time = Local::now();
        let duration = end_time.signed_duration_since(self.start_time);
        self.set_tag(
            "host_end_time",
            end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        self.set_tag("host_duration", format_duration(&duration))?;
        self.api.post(
            "runs/update",
            &UpdateRunParams {
                run_id: &self.run_id,
                status: "FINISHED",
                end_time: end_time.timestamp_millis(),
                run_name: &self.run_name,
            },
        )?;
        info!("Finished run '{}'", self.run_name);

        Ok(())
    }
}

fn format_duration(dt: &Duration) -> String {
    let mut seconds = dt.num_seconds();
    let mut minutes = seconds / 60;
    seconds %= 60;
    let hours = minutes / 60;
    minutes %= 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Flattens a JSON object into `parent.child` keys with string values.
fn flatten(value: &Value) -> Result<BTreeMap<String, String>> {
    let flatten_map = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(map) => flatten_serde_json::flatten(map),
        _ => {
            return Err(TetherError::ConfigurationError(format!(
                "run configuration must be an object: {}",
                value
            ))
            .into())
        }
    };
    Ok(flatten_map
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            value => (key, value.to_string()),
        })
        .collect())
}

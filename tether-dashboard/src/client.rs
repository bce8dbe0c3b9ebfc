use crate::{Dashboard, Experiment, Run, SessionOptions, TrackingSession};
use anyhow::Result;
use chrono::Local;
use log::info;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
/// Internally used.
struct Experiment_ {
    experiment: Experiment,
}

#[derive(Debug, Deserialize)]
/// Internally used.
struct Run_ {
    run: Run,
}

#[derive(Debug, Serialize)]
/// Parameters adapted from <https://mlflow.org/docs/latest/rest-api.html#create-run>.
struct CreateRunParams<'a> {
    experiment_id: &'a str,
    start_time: i64,
    run_name: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateExperimentParams<'a> {
    name: &'a str,
}

/// Access to the REST API, shared by the client and its sessions.
#[derive(Clone)]
pub(crate) struct Api {
    client: Client,
    base_url: String,
    user_name: String,
    password: String,
}

impl Api {
    pub(crate) fn url(&self, api: impl AsRef<str>) -> String {
        format!("{}/api/2.0/mlflow/{}", self.base_url, api.as_ref())
    }

    /// Sends a GET request. The status of the response is not checked.
    pub(crate) fn get(&self, api: &str, query: &impl Serialize) -> Result<Response> {
        let resp = self
            .client
            .get(self.url(api))
            .basic_auth(&self.user_name, Some(&self.password))
            .query(query)
            .send()?;
        Ok(resp)
    }

    /// Sends a POST request with a JSON body, failing on a non-success status.
    pub(crate) fn post(&self, api: &str, params: &impl Serialize) -> Result<Response> {
        let resp = self
            .client
            .post(self.url(api))
            .basic_auth(&self.user_name, Some(&self.password))
            .json(params)
            .send()?
            .error_for_status()?;
        Ok(resp)
    }
}

/// Provides access to a MLflow tracking server via REST API.
///
/// Support Mlflow API version 2.0.
pub struct TrackingClient {
    api: Api,
}

impl TrackingClient {
    /// Creates a client of the server at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            api: Api {
                client: Client::new(),
                base_url: base_url.as_ref().trim_end_matches('/').to_string(),
                user_name: "".to_string(),
                password: "".to_string(),
            },
        }
    }

    /// Set user name and password for basic authentication of the tracking server.
    pub fn basic_auth(mut self, user_name: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        self.api.user_name = user_name.as_ref().to_string();
        self.api.password = password.as_ref().to_string();
        self
    }

    /// Base URL of the tracking server.
    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    /// Get [`Experiment`] by name from the tracking server.
    ///
    /// If the experiment with given name does not exist in the tracking server,
    /// it will be created.
    pub fn get_experiment(&self, name: &str) -> Result<Experiment> {
        let query = [("experiment_name", name)];
        let resp = self.api.get("experiments/get-by-name", &query)?;
        let resp = if resp.status().is_success() {
            resp
        } else {
            info!("Experiment '{}' was not found, creating it", name);
            self.api
                .post("experiments/create", &CreateExperimentParams { name })?;
            self.api
                .get("experiments/get-by-name", &query)?
                .error_for_status()?
        };
        let experiment: Experiment_ = resp.json()?;

        Ok(experiment.experiment)
    }

    /// Creates a run in `experiment_id`.
    ///
    /// If `run_name` is empty (`""`), a run name is generated by the tracking server.
    pub fn create_run(&self, experiment_id: &str, run_name: &str) -> Result<Run> {
        let resp = self.api.post(
            "runs/create",
            &CreateRunParams {
                experiment_id,
                start_time: Local::now().timestamp_millis(),
                run_name,
            },
        )?;
        let run: Run_ = resp.json()?;
        if run_name.is_empty() {
            info!(
                "Run name '{}' has been automatically generated",
                run.run.info.run_name
            );
        }

        Ok(run.run)
    }
}

impl Dashboard for TrackingClient {
    type Session = TrackingSession;

    /// Creates a run in the experiment named in `options`, then tags it and
    /// logs `config` as its parameters.
    fn init_session(&self, config: &Value, options: &SessionOptions) -> Result<TrackingSession> {
        let experiment = self.get_experiment(&options.experiment)?;
        info!(
            "For experiment '{}', id={} is used",
            options.experiment, experiment.experiment_id
        );
        let run = self.create_run(&experiment.experiment_id, &options.run_name)?;
        let session = TrackingSession::new(self.api.clone(), &run)?;
        for (key, value) in options.tags.iter() {
            session.set_tag(key, value)?;
        }
        session.log_params(config)?;

        Ok(session)
    }
}

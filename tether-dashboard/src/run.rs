use serde::Deserialize;

/// A run as returned by the tracking server.
///
/// Only `info` is kept, metrics and params logged to the run are not read back.
#[derive(Debug, Deserialize)]
pub struct Run {
    pub info: RunInfo,
}

/// Fields taken from <https://mlflow.org/docs/latest/rest-api.html#runinfo>.
#[derive(Debug, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub run_name: String,
    pub experiment_id: String,
    pub status: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub artifact_uri: Option<String>,
}

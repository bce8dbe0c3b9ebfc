//! A key-value writer forwarding training metrics to an experiment-tracking dashboard.
//!
//! [`DashboardOutputFormat`] implements [`KvWriter`](tether_core::writer::KvWriter).
//! It opens one [`DashboardSession`] at construction, logging the run
//! configuration once, and forwards every value not excluded from the `"wandb"`
//! output format to that session, keyed by the step.
//!
//! The session is obtained from a [`Dashboard`]. [`TrackingClient`] is a
//! [`Dashboard`] talking to an [MLflow](https://mlflow.org) tracking server over
//! its REST API. Run a server with:
//!
//! ```bash
//! mlflow server --host 127.0.0.1 --port 8080
//! ```
//!
//! Then:
//!
//! ```no_run
//! use anyhow::Result;
//! use serde::Serialize;
//! use tether_core::writer::{Exclusion, KeyValues, KvWriter};
//! use tether_dashboard::{DashboardOutputFormat, SessionOptions, TrackingClient};
//!
//! #[derive(Serialize)]
//! struct HyperParameters {
//!     lr: f64,
//!     batch_size: usize,
//! }
//!
//! fn main() -> Result<()> {
//!     let client = TrackingClient::new("http://localhost:8080");
//!     let options = SessionOptions::default().experiment("Default");
//!     let config = HyperParameters { lr: 3e-4, batch_size: 64 };
//!     let mut writer = DashboardOutputFormat::new(&client, &options, &config)?;
//!
//!     let mut key_values = KeyValues::new();
//!     key_values.insert("loss", 1.0f32, Exclusion::None);
//!     key_values.insert("reward", 2.0f32, "wandb");
//!     writer.write(&key_values, 5)?; // only "loss" is sent
//!     writer.close()?;
//!     Ok(())
//! }
//! ```
//!
//! Nested configuration is flattened, e.g. `hyper_params.lr`.
mod base;
mod client;
mod experiment;
mod options;
mod output_format;
mod run;
mod session;

pub use base::{Dashboard, DashboardSession};
pub use client::TrackingClient;
pub use experiment::{Experiment, ExperimentTag};
pub use options::SessionOptions;
pub use output_format::{DashboardOutputFormat, FORMAT_NAME};
pub use run::{Run, RunInfo};
pub use session::TrackingSession;

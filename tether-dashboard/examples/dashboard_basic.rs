//! Logs a fake training curve to an MLflow tracking server.
//!
//! ```bash
//! mlflow server --host 127.0.0.1 --port 8080
//! cargo run --example dashboard_basic -- --url http://127.0.0.1:8080
//! ```
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tether_core::writer::{Exclusion, KeyValues, KvWriter};
use tether_dashboard::{DashboardOutputFormat, SessionOptions, TrackingClient};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Base URL of the tracking server.
    #[arg(long, default_value = "http://localhost:8080")]
    url: String,

    /// Experiment name.
    #[arg(long, default_value = "Default")]
    experiment: String,

    /// Optional YAML file with session options, overriding --experiment.
    #[arg(long)]
    options: Option<String>,
}

// Nested configuration struct
#[derive(Debug, Serialize)]
struct Config {
    env_params: String,
    hyper_params: HyperParameters,
}

#[derive(Debug, Serialize)]
struct HyperParameters {
    batch_size: usize,
    lr: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let options = match &args.options {
        Some(path) => SessionOptions::load(path)?,
        None => SessionOptions::default()
            .experiment(&args.experiment)
            .tag("source", "dashboard_basic"),
    };
    let config = Config {
        env_params: "CartPole-v1".to_string(),
        hyper_params: HyperParameters {
            batch_size: 64,
            lr: 3e-4,
        },
    };

    let client = TrackingClient::new(&args.url);
    let mut writer = DashboardOutputFormat::new(&client, &options, &config)?;

    for step in 0..100u64 {
        let t = step as f32;
        let mut key_values = KeyValues::new();
        key_values.insert("train/loss", (-0.05 * t).exp(), Exclusion::None);
        key_values.insert("time/fps", 1000.0f32, "wandb");
        writer.write(&key_values, step)?;
    }
    writer.close()?;

    Ok(())
}

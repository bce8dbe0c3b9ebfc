//! Sinks receiving a batch of named values at a given step.
//!
//! A metrics-logging framework owns any number of [`KvWriter`]s (console, file,
//! remote dashboard, ...) and hands the same [`KeyValues`] to each of them.
//! Every entry carries an [`Exclusion`] listing the output formats that must not
//! receive it; each writer checks its own format name.
//!
//! ```rust
//! use tether_core::writer::{Exclusion, KeyValues, KvWriter, NullWriter};
//!
//! let mut key_values = KeyValues::new();
//! key_values.insert("loss", 1.0f32, Exclusion::None);
//! key_values.insert("reward", 2.0f32, "wandb");
//!
//! let included: Vec<_> = key_values.included("wandb").map(|(k, _)| k.as_str()).collect();
//! assert_eq!(included, vec!["loss"]);
//!
//! let mut writer = NullWriter::default();
//! writer.write(&key_values, 5).unwrap();
//! writer.close().unwrap();
//! ```
mod base;
mod null_writer;

pub use base::{Exclusion, KeyValues, KvWriter};
pub use null_writer::NullWriter;

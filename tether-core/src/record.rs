//! Named values emitted by environments and training loops.
//!
//! A [`Record`] maps keys to [`RecordValue`]s. Environments return one from
//! [`Env::step`](crate::Env::step), and [`KeyValues`](crate::writer::KeyValues)
//! are typically built from a record before being handed to a
//! [`KvWriter`](crate::writer::KvWriter).
//!
//! ```rust
//! use tether_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("Step", RecordValue::Scalar(1.0));
//! record.insert("Reward", RecordValue::Scalar(-1.0));
//! record.insert("Obs", RecordValue::Array1(vec![1.0, 2.0, 3.0]));
//! assert_eq!(record.get("Reward"), Some(&RecordValue::Scalar(-1.0)));
//! ```
mod base;

pub use base::{Record, RecordValue};

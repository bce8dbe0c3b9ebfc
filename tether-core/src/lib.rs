#![warn(missing_docs)]
//! Environment wrappers and key-value writers for reinforcement learning experiments.
//!
//! * [`video::VideoWrapper`] wraps an [`Env`] and drives a [`video::FrameRecorder`]
//!   on episode boundaries and environment steps.
//! * [`writer::KvWriter`] is the interface of sinks receiving a batch of named
//!   values at a given step. Remote dashboard sinks live in other crates.
pub mod error;
pub mod record;
pub mod video;
pub mod writer;

mod base;
pub use base::{Act, Env, Info, Obs, Render, Step};

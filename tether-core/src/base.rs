//! Core functionalities.
mod env;
mod render;
mod step;
pub use env::Env;
pub use render::Render;
use std::fmt::Debug;
pub use step::{Info, Step};

/// Observation of an environment.
pub trait Obs: Clone + Debug {}

/// Action of an environment.
pub trait Act: Clone + Debug {}

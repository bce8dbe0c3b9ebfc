//! Recording rendered frames of an environment into videos.
//!
//! [`VideoWrapper`] observes the reset/step lifecycle of a wrapped [`Env`] and
//! drives a [`FrameRecorder`]:
//!
//! * On [`Env::reset`], when the episode is sampled, a recorder is opened. In
//!   single-video mode only the first one is opened and it spans all episodes;
//!   otherwise the previous recorder is closed and a new one opened with base
//!   path `<directory>/video.<episode_id:06>`.
//! * On [`Env::step`], when the episode is sampled, a frame is captured.
//! * An episode is sampled when no save interval is set, or when
//!   `episode_id % save_interval == 0`.
//!
//! [`ImageSequenceRecorder`] is a recorder writing PNG frames and a metadata file.
//!
//! [`Env`]: crate::Env
//! [`Env::reset`]: crate::Env::reset
//! [`Env::step`]: crate::Env::step
mod config;
mod image_sequence;
mod recorder;
mod wrapper;

pub use config::VideoWrapperConfig;
pub use image_sequence::{ImageSequenceRecorder, ImageSequenceRecorderConfig};
pub use recorder::{FrameRecorder, RecorderMetadata};
pub use wrapper::VideoWrapper;

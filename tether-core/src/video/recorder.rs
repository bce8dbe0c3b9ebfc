use crate::Render;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata given to a recorder when it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderMetadata {
    /// Episode at which the recorder was opened.
    pub episode_id: usize,
}

/// Serializes rendered frames of an environment into a video artifact.
///
/// The recorder does not own the environment. It receives a reference at
/// construction and at every capture.
pub trait FrameRecorder<E: Render>: Sized {
    /// Configurations.
    type Config: Clone;

    /// Opens a recorder writing to the artifact(s) at `base_path`.
    fn build(
        config: &Self::Config,
        env: &E,
        base_path: &Path,
        metadata: RecorderMetadata,
    ) -> Result<Self>;

    /// Renders the current state of `env` and appends it to the video.
    fn capture_frame(&mut self, env: &E) -> Result<()>;

    /// Flushes and releases the video artifact.
    fn close(&mut self) -> Result<()>;
}

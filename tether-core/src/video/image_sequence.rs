use super::{FrameRecorder, RecorderMetadata};
use crate::{error::TetherError, Render};
use anyhow::Result;
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Configuration of [`ImageSequenceRecorder`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ImageSequenceRecorderConfig {
    /// Playback rate written to the metadata file.
    pub frames_per_sec: u32,
}

impl Default for ImageSequenceRecorderConfig {
    fn default() -> Self {
        Self { frames_per_sec: 30 }
    }
}

impl ImageSequenceRecorderConfig {
    /// Sets the playback rate.
    pub fn frames_per_sec(mut self, v: u32) -> Self {
        self.frames_per_sec = v;
        self
    }
}

#[derive(Debug, Serialize)]
struct VideoMetadata<'a> {
    #[serde(flatten)]
    metadata: &'a RecorderMetadata,
    frames: usize,
    frames_per_sec: u32,
}

/// Records frames as a sequence of PNG images.
///
/// For base path `videos/video.000000`, frames are written to
/// `videos/video.000000/frame_<n:06>.png`. On close, the metadata, the number of
/// frames and the playback rate are written to `videos/video.000000.meta.json`.
/// The sequence can be encoded afterwards, e.g. with
/// `ffmpeg -framerate 30 -i frame_%06d.png video.mp4`.
pub struct ImageSequenceRecorder {
    base_path: PathBuf,
    metadata: RecorderMetadata,
    frames_per_sec: u32,
    n_frames: usize,
    closed: bool,
}

impl ImageSequenceRecorder {
    /// Directory the frames are written to.
    pub fn frames_dir(&self) -> &Path {
        &self.base_path
    }

    /// Path of the metadata file written on close.
    pub fn metadata_path(&self) -> PathBuf {
        let mut path = OsString::from(self.base_path.as_os_str());
        path.push(".meta.json");
        path.into()
    }

    /// Number of frames captured so far.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }
}

impl<E: Render> FrameRecorder<E> for ImageSequenceRecorder {
    type Config = ImageSequenceRecorderConfig;

    fn build(
        config: &Self::Config,
        _env: &E,
        base_path: &Path,
        metadata: RecorderMetadata,
    ) -> Result<Self> {
        fs::create_dir_all(base_path)?;
        info!("Recording frames to {:?}", base_path);

        Ok(Self {
            base_path: base_path.to_path_buf(),
            metadata,
            frames_per_sec: config.frames_per_sec,
            n_frames: 0,
            closed: false,
        })
    }

    fn capture_frame(&mut self, env: &E) -> Result<()> {
        if self.closed {
            return Err(TetherError::InvariantError(format!(
                "capture on closed recorder {:?}",
                self.base_path
            ))
            .into());
        }

        let frame = env.render()?;
        let path = self
            .base_path
            .join(format!("frame_{:06}.png", self.n_frames));
        frame.save(&path)?;
        trace!("Saved {:?}", &path);
        self.n_frames += 1;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let path = self.metadata_path();
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(
            BufWriter::new(file),
            &VideoMetadata {
                metadata: &self.metadata,
                frames: self.n_frames,
                frames_per_sec: self.frames_per_sec,
            },
        )?;
        self.closed = true;
        info!("Closed {:?} with {} frames", self.base_path, self.n_frames);

        Ok(())
    }
}

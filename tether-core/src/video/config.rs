//! Configuration of [`VideoWrapper`](super::VideoWrapper).
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`VideoWrapper`](super::VideoWrapper).
///
/// `C` is the configuration of the wrapped environment and `R` that of the
/// recorder.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct VideoWrapperConfig<C, R> {
    /// Configuration of the wrapped environment.
    pub env_config: C,

    /// Configuration of the recorders.
    pub recorder_config: R,

    /// Output directory. It must not exist.
    pub directory: PathBuf,

    /// If `true`, a single video spans all episodes.
    #[serde(default = "default_single_video")]
    pub single_video: bool,

    /// Number of episodes between saved videos. Only valid with `single_video == false`.
    #[serde(default)]
    pub save_interval: Option<usize>,
}

fn default_single_video() -> bool {
    true
}

impl<C, R> VideoWrapperConfig<C, R> {
    /// Creates a configuration recording a single video into `directory`.
    pub fn new(env_config: C, recorder_config: R, directory: impl Into<PathBuf>) -> Self {
        Self {
            env_config,
            recorder_config,
            directory: directory.into(),
            single_video: true,
            save_interval: None,
        }
    }

    /// Sets whether a single video spans all episodes.
    pub fn single_video(mut self, v: bool) -> Self {
        self.single_video = v;
        self
    }

    /// Sets the number of episodes between saved videos.
    pub fn save_interval(mut self, v: Option<usize>) -> Self {
        self.save_interval = v;
        self
    }
}

impl<C, R> VideoWrapperConfig<C, R>
where
    C: DeserializeOwned,
    R: DeserializeOwned,
{
    /// Constructs [`VideoWrapperConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }
}

impl<C, R> VideoWrapperConfig<C, R>
where
    C: Serialize,
    R: Serialize,
{
    /// Saves [`VideoWrapperConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

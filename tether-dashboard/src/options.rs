//! Options of a dashboard session.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Options of a dashboard session, forwarded to [`Dashboard::init_session`].
///
/// [`Dashboard::init_session`]: crate::Dashboard::init_session
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SessionOptions {
    /// Name of the experiment the run belongs to. Created if missing.
    #[serde(default = "default_experiment")]
    pub experiment: String,

    /// Name of the run. If empty, the name is generated by the server.
    #[serde(default)]
    pub run_name: String,

    /// Tags set on the run at its start.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

fn default_experiment() -> String {
    "Default".to_string()
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            experiment: default_experiment(),
            run_name: String::new(),
            tags: BTreeMap::new(),
        }
    }
}

impl SessionOptions {
    /// Sets the experiment name.
    pub fn experiment(mut self, v: impl Into<String>) -> Self {
        self.experiment = v.into();
        self
    }

    /// Sets the run name.
    pub fn run_name(mut self, v: impl Into<String>) -> Self {
        self.run_name = v.into();
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Constructs [`SessionOptions`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SessionOptions`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

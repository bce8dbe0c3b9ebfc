use crate::record::{Record, RecordValue};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};

/// Output formats an entry must not be written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Exclusion {
    /// Written to every format.
    None,

    /// A single tag. A format is excluded when its name is a substring of the tag.
    Format(String),

    /// A set of tags. A format is excluded when its name equals one of them.
    Formats(Vec<String>),
}

impl Exclusion {
    /// Returns `true` if the entry must not be written to the format `name`.
    pub fn excludes(&self, name: &str) -> bool {
        match self {
            Exclusion::None => false,
            Exclusion::Format(tag) => tag.contains(name),
            Exclusion::Formats(tags) => tags.iter().any(|tag| tag == name),
        }
    }
}

impl Default for Exclusion {
    fn default() -> Self {
        Exclusion::None
    }
}

impl From<&str> for Exclusion {
    fn from(tag: &str) -> Self {
        Exclusion::Format(tag.to_string())
    }
}

impl From<Option<&str>> for Exclusion {
    fn from(tag: Option<&str>) -> Self {
        tag.map_or(Exclusion::None, Exclusion::from)
    }
}

impl From<&[&str]> for Exclusion {
    fn from(tags: &[&str]) -> Self {
        Exclusion::Formats(tags.iter().map(|t| t.to_string()).collect())
    }
}

/// Values to be written at a single step, keyed and ordered by name.
///
/// Each value is stored together with its [`Exclusion`], so a value can never
/// be paired with the exclusion tag of another key.
#[derive(Debug, Clone, Default)]
pub struct KeyValues(BTreeMap<String, (RecordValue, Exclusion)>);

impl KeyValues {
    /// Creates an empty set of key-values.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Takes every value in `record`, excluded from no format.
    pub fn from_record(record: Record) -> Self {
        Self(
            record
                .into_iter()
                .map(|(k, v)| (k, (v, Exclusion::None)))
                .collect(),
        )
    }

    /// Inserts a value, replacing any previous entry with the same key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<RecordValue>,
        exclusion: impl Into<Exclusion>,
    ) {
        self.0.insert(key.into(), (value.into(), exclusion.into()));
    }

    /// Gets the value and exclusion of `key`.
    pub fn get(&self, key: &str) -> Option<&(RecordValue, Exclusion)> {
        self.0.get(key)
    }

    /// Iterates over all entries in lexicographic key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, (RecordValue, Exclusion)> {
        self.0.iter()
    }

    /// Iterates, in lexicographic key order, over the values not excluded from
    /// the format `name`.
    pub fn included<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a RecordValue)> + 'a {
        self.0
            .iter()
            .filter(move |(_, (_, exclusion))| !exclusion.excludes(name))
            .map(|(k, (v, _))| (k, v))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Writes a batch of named values at a given step to an output destination.
pub trait KvWriter {
    /// Writes the values in `key_values` not excluded from this writer's format.
    fn write(&mut self, key_values: &KeyValues, step: u64) -> Result<()>;

    /// Flushes and releases the output destination.
    ///
    /// Implementations make this method idempotent.
    fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_single_tag_matches_substring() {
        assert!(Exclusion::from("wandb").excludes("wandb"));
        assert!(Exclusion::from("stdout,wandb").excludes("wandb"));
        assert!(!Exclusion::from("stdout").excludes("wandb"));
        assert!(!Exclusion::None.excludes("wandb"));
    }

    #[test]
    fn test_exclusion_tag_set_matches_elements() {
        let tags: &[&str] = &["stdout", "wandb"];
        assert!(Exclusion::from(tags).excludes("wandb"));
        let tags: &[&str] = &["wandb_extra"];
        assert!(!Exclusion::from(tags).excludes("wandb"));
    }

    #[test]
    fn test_included_is_sorted_and_filtered() {
        let mut kv = KeyValues::new();
        kv.insert("zeta", 3.0f32, Exclusion::None);
        kv.insert("alpha", 1.0f32, Option::<&str>::None);
        kv.insert("mid", 2.0f32, "wandb");
        let keys: Vec<_> = kv.included("wandb").map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);
        let keys: Vec<_> = kv.included("csv").map(|(k, _)| k.clone()).collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_from_record() {
        let record = Record::from_slice(&[
            ("loss", RecordValue::Scalar(0.5)),
            ("env", RecordValue::String("Pong".to_string())),
        ]);
        let kv = KeyValues::from_record(record);
        assert_eq!(kv.len(), 2);
        assert_eq!(
            kv.get("loss"),
            Some(&(RecordValue::Scalar(0.5), Exclusion::None))
        );
    }
}

use super::{KeyValues, KvWriter};
use anyhow::Result;

/// A writer that ignores any value. Used for debugging and as a placeholder sink.
#[derive(Debug, Default)]
pub struct NullWriter {}

impl KvWriter for NullWriter {
    /// Discards the given values.
    fn write(&mut self, _key_values: &KeyValues, _step: u64) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

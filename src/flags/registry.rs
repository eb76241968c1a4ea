use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{Flag, FlagPatch};
use crate::error::{FlagError, Result};

/// In-memory flag store keyed by name.
///
/// Reads share the lock; `put`, `patch` and `delete` hold it exclusively for
/// the whole read-modify-write, so every operation is linearizable.
#[derive(Debug, Default)]
pub struct FlagRegistry {
    flags: RwLock<HashMap<String, Flag>>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All flags sorted by name, taken from a single consistent snapshot.
    pub fn list(&self) -> Vec<Flag> {
        let mut out: Vec<Flag> = self.flags.read().values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn get(&self, name: &str) -> Result<Flag> {
        self.flags
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FlagError::NotFound(name.to_string()))
    }

    /// Inserts or fully replaces the flag stored under `flag.name`.
    pub fn put(&self, mut flag: Flag) -> Flag {
        let mut flags = self.flags.write();

        let previous = flags.get(&flag.name).map(|f| f.updated_at);
        flag.normalize();
        flag.updated_at = next_updated_at(previous);
        flags.insert(flag.name.clone(), flag.clone());

        flag
    }

    pub fn patch(&self, name: &str, patch: FlagPatch) -> Result<Flag> {
        let mut flags = self.flags.write();

        let flag = flags
            .get_mut(name)
            .ok_or_else(|| FlagError::NotFound(name.to_string()))?;

        patch.apply_to(flag);
        flag.updated_at = next_updated_at(Some(flag.updated_at));

        Ok(flag.clone())
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.flags
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| FlagError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.flags.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.read().is_empty()
    }
}

// Never moves backwards, even if the wall clock does
fn next_updated_at(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(previous) if previous > now => previous,
        _ => now,
    }
}

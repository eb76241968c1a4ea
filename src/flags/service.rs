use std::sync::Arc;

use super::{Flag, FlagPatch, FlagRegistry};
use crate::error::Result;
use crate::evaluation;

/// Decision plus the flag it was made against, so callers can report the
/// rollout settings alongside the boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub enabled: bool,
    pub flag: Flag,
}

/// Flag CRUD and evaluation on top of a shared registry.
#[derive(Debug, Clone)]
pub struct FlagService {
    registry: Arc<FlagRegistry>,
}

impl FlagService {
    pub fn new(registry: Arc<FlagRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    pub fn list(&self) -> Vec<Flag> {
        self.registry.list()
    }

    pub fn get(&self, name: &str) -> Result<Flag> {
        self.registry.get(name)
    }

    pub fn put(&self, flag: Flag) -> Flag {
        let stored = self.registry.put(flag);
        tracing::info!(flag = %stored.name, enabled = stored.enabled, "flag stored");
        stored
    }

    pub fn patch(&self, name: &str, patch: FlagPatch) -> Result<Flag> {
        let updated = self.registry.patch(name, patch)?;
        tracing::info!(flag = %updated.name, enabled = updated.enabled, "flag patched");
        Ok(updated)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.registry.delete(name)?;
        tracing::info!(flag = %name, "flag deleted");
        Ok(())
    }

    pub fn evaluate(&self, name: &str, env: &str, user_key: &str) -> Result<Evaluation> {
        let flag = self.registry.get(name)?;
        let enabled = evaluation::evaluate(&flag, env, user_key);

        tracing::debug!(flag = %name, env, enabled, "flag evaluated");

        Ok(Evaluation { enabled, flag })
    }
}

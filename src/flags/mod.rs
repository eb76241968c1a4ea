pub mod registry;
pub mod seed;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use registry::FlagRegistry;
pub use service::{Evaluation, FlagService};

// MODELS

/// Activation policy selector. Unknown values are kept verbatim so they
/// round-trip through the registry, but they never evaluate to on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RolloutType {
    All,
    None,
    Percentage,
    #[default]
    Unspecified,
    Other(String),
}

impl RolloutType {
    pub fn as_str(&self) -> &str {
        match self {
            RolloutType::All => "all",
            RolloutType::None => "none",
            RolloutType::Percentage => "percentage",
            RolloutType::Unspecified => "",
            RolloutType::Other(other) => other,
        }
    }
}

impl From<String> for RolloutType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "all" => RolloutType::All,
            "none" => RolloutType::None,
            "percentage" => RolloutType::Percentage,
            "" => RolloutType::Unspecified,
            _ => RolloutType::Other(value),
        }
    }
}

impl From<&str> for RolloutType {
    fn from(value: &str) -> Self {
        RolloutType::from(value.to_string())
    }
}

impl From<RolloutType> for String {
    fn from(value: RolloutType) -> Self {
        match value {
            RolloutType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rollout {
    #[serde(rename = "type", default)]
    pub rollout_type: RolloutType,
    // 0-100, only read when rollout_type is Percentage
    #[serde(default, skip_serializing_if = "is_zero")]
    pub percentage: i64,
}

impl Rollout {
    pub fn all() -> Self {
        Self { rollout_type: RolloutType::All, percentage: 0 }
    }

    pub fn none() -> Self {
        Self { rollout_type: RolloutType::None, percentage: 0 }
    }

    pub fn percentage(percentage: i64) -> Self {
        Self { rollout_type: RolloutType::Percentage, percentage }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Flag {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    // empty means every environment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<String>,
    #[serde(default)]
    pub rollout: Rollout,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Flag {
    // An empty description is stored as absent
    pub(crate) fn normalize(&mut self) {
        if self.description.as_deref() == Some("") {
            self.description = None;
        }
    }

    pub fn new(name: impl Into<String>, enabled: bool, rollout: Rollout) -> Self {
        Self {
            name: name.into(),
            enabled,
            rollout,
            ..Default::default()
        }
    }
}

/// Partial update. `None` leaves the field alone; `Some` replaces it,
/// including `Some(vec![])` for `envs`, which lifts every environment
/// restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub envs: Option<Vec<String>>,
    #[serde(default)]
    pub rollout: Option<Rollout>,
}

impl FlagPatch {
    /// Applies the present fields onto `flag`.
    pub fn apply_to(self, flag: &mut Flag) {
        if let Some(enabled) = self.enabled {
            flag.enabled = enabled;
        }
        if let Some(description) = self.description {
            flag.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(envs) = self.envs {
            flag.envs = envs;
        }
        if let Some(rollout) = self.rollout {
            flag.rollout = rollout;
        }
    }
}

// HELPER FUNCTIONS

fn is_zero(value: &i64) -> bool {
    *value == 0
}

// Flag names are used as a single path segment
pub fn validate_flag_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("flag name required".to_string());
    }

    if name.contains('/') {
        return Err(format!("flag name '{}' must not contain '/'", name));
    }

    Ok(())
}

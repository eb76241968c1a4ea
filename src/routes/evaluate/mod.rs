pub mod routes;

use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "dev";

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateQuery {
    pub env: Option<String>,
    pub user: Option<String>,
}

impl EvaluateQuery {
    pub fn env(&self) -> &str {
        match self.env.as_deref() {
            Some(env) if !env.is_empty() => env,
            _ => DEFAULT_ENV,
        }
    }

    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub name: String,
    pub env: String,
    pub user: String,
    pub enabled: bool,
    pub rollout_type: String,
    pub percentage: i64,
}

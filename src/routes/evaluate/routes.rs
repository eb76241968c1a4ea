use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};

use super::{EvaluateQuery, EvaluateResponse};
use crate::error::ApiError;
use crate::routes::flags::checked_name;
use crate::state::AppState;

/// Evaluate one flag for an environment and user
pub async fn evaluate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<EvaluateQuery>, QueryRejection>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let name = checked_name(&name)?;
    let Query(query) = query?;

    let env = query.env();
    let user = query.user();

    let evaluation = state.flags.evaluate(name, env, user)?;

    Ok(Json(EvaluateResponse {
        name: evaluation.flag.name,
        env: env.to_string(),
        user: user.to_string(),
        enabled: evaluation.enabled,
        rollout_type: evaluation.flag.rollout.rollout_type.as_str().to_string(),
        percentage: evaluation.flag.rollout.percentage,
    }))
}

use axum::{ Json, http::StatusCode };
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
}

#[derive(Serialize)]
pub struct Liveness {
    ok: bool,
}

pub async fn health() -> Json<HealthData> {
    let health_data = HealthData { status: StatusCode::OK.as_u16() };
    Json(health_data)
}

pub async fn healthz() -> Json<Liveness> {
    Json(Liveness { ok: true })
}

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::cors::CorsLayer;

mod evaluate;
mod flags;
mod health;
mod middleware_request;

pub use health::{health, healthz};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let flag_router = Router::new()
        .route("/flags", get(flags::routes::list).post(flags::routes::create))
        .route("/flags/", any(flags::routes::missing_name))
        .route(
            "/flags/{*name}",
            get(flags::routes::get)
                .patch(flags::routes::update)
                .delete(flags::routes::delete),
        )
        .route("/evaluate/", any(flags::routes::missing_name))
        .route("/evaluate/{*name}", get(evaluate::routes::evaluate))
        .layer(middleware::from_fn(middleware_request::trace_request));

    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .merge(flag_router)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{Flag, FlagRegistry, FlagService, Rollout};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<FlagService>) {
        let state = AppState::new(FlagService::new(Arc::new(FlagRegistry::new())));
        let flags = Arc::clone(&state.flags);
        (routes().with_state(state), flags)
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

        (status, value)
    }

    #[tokio::test]
    async fn test_healthz() {
        let (app, _) = test_app();
        let (status, body) = send(app, Method::GET, "/healthz", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (app, _) = test_app();

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/flags",
            Some(json!({"name": "beta", "enabled": true, "envs": ["prod"], "rollout": {"type": "percentage", "percentage": 25}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.get("updatedAt").is_some());

        let (status, fetched) = send(app, Method::GET, "/flags/beta", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
        assert_eq!(fetched["rollout"]["percentage"], 25);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_body() {
        let (app, _) = test_app();

        let (status, body) = send(app.clone(), Method::POST, "/flags", Some(json!({"name": "x", "bogus": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");

        let (status, body) = send(app, Method::POST, "/flags", Some(json!({"name": "a/b", "enabled": true}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_name");
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let (app, flags) = test_app();
        for name in ["zeta", "alpha", "mid"] {
            flags.put(Flag::new(name, true, Rollout::all()));
        }

        let (status, body) = send(app, Method::GET, "/flags", None).await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<&str> = body["flags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_patch_keeps_absent_fields() {
        let (app, flags) = test_app();
        let mut flag = Flag::new("checkout", false, Rollout::percentage(10));
        flag.envs = vec!["dev".to_string()];
        flags.put(flag);

        let (status, body) = send(app.clone(), Method::PATCH, "/flags/checkout", Some(json!({"enabled": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], true);
        assert_eq!(body["envs"], json!(["dev"]));
        assert_eq!(body["rollout"]["percentage"], 10);

        let (status, body) = send(app, Method::PATCH, "/flags/checkout", Some(json!({"envs": []}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("envs").is_none());
        assert!(flags.get("checkout").unwrap().envs.is_empty());
    }

    #[tokio::test]
    async fn test_patch_missing_is_not_found() {
        let (app, _) = test_app();
        let (status, body) = send(app, Method::PATCH, "/flags/ghost", Some(json!({"enabled": true}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_delete() {
        let (app, flags) = test_app();
        flags.put(Flag::new("old", true, Rollout::all()));

        let (status, body) = send(app.clone(), Method::DELETE, "/flags/old", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"deleted": "old"}));

        let (status, _) = send(app.clone(), Method::GET, "/flags/old", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app, Method::DELETE, "/flags/old", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nested_name_is_invalid() {
        let (app, _) = test_app();

        let (status, body) = send(app.clone(), Method::GET, "/flags/a/b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_name");

        let (status, body) = send(app, Method::GET, "/evaluate/a/b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_name");
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid() {
        let (app, _) = test_app();

        for (method, uri) in [
            (Method::GET, "/flags/"),
            (Method::PATCH, "/flags/"),
            (Method::DELETE, "/flags/"),
            (Method::GET, "/evaluate/"),
        ] {
            let (status, body) = send(app.clone(), method, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "invalid_name", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_percentage_beyond_i32_is_stored() {
        let (app, _) = test_app();

        let (status, body) = send(
            app,
            Method::POST,
            "/flags",
            Some(json!({"name": "big", "enabled": true, "rollout": {"type": "percentage", "percentage": 5_000_000_000i64}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["rollout"]["percentage"], 5_000_000_000i64);
    }

    #[tokio::test]
    async fn test_patch_with_empty_description_omits_it() {
        let (app, flags) = test_app();
        let mut flag = Flag::new("described", true, Rollout::all());
        flag.description = Some("before".to_string());
        flags.put(flag);

        let (status, body) = send(app, Method::PATCH, "/flags/described", Some(json!({"description": ""}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("description").is_none());
    }

    #[tokio::test]
    async fn test_root_is_not_routed() {
        let (app, _) = test_app();
        let (status, _) = send(app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_evaluate() {
        let (app, flags) = test_app();
        flags.put(Flag::new("beta", true, Rollout::percentage(25)));

        let (status, body) = send(app, Method::GET, "/evaluate/beta?env=prod&user=user1", None).await;
        assert_eq!(status, StatusCode::OK);

        let expected = crate::evaluation::bucket("beta", "prod", "user1") < 25;
        assert_eq!(
            body,
            json!({
                "name": "beta",
                "env": "prod",
                "user": "user1",
                "enabled": expected,
                "rolloutType": "percentage",
                "percentage": 25
            })
        );
    }

    #[tokio::test]
    async fn test_evaluate_defaults_env_to_dev() {
        let (app, flags) = test_app();
        let mut flag = Flag::new("dev-only", true, Rollout::all());
        flag.envs = vec!["DEV".to_string()];
        flags.put(flag);

        let (status, body) = send(app, Method::GET, "/evaluate/dev-only", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["env"], "dev");
        assert_eq!(body["user"], "");
        assert_eq!(body["enabled"], true);
        assert_eq!(body["rolloutType"], "all");
        assert_eq!(body["percentage"], 0);
    }

    #[tokio::test]
    async fn test_evaluate_missing_flag() {
        let (app, _) = test_app();
        let (status, body) = send(app, Method::GET, "/evaluate/ghost?env=prod", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed_or_generated() {
        let (app, _) = test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/flags")
                    .header("x-request-id", "abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc123");

        let response = app
            .oneshot(Request::builder().uri("/flags").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let generated = response.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(generated.len(), 32);
    }
}

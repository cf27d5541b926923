use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use refri_express::AuthGate;
use refri_express::config::Config;
use refri_express::error::{ACCESS_DENIED_MESSAGE, RefriError};
use refri_express::router::{RefriState, refri_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "S";

fn app() -> Router {
    let cfg = Config {
        jwt_secret: Some(SECRET.to_string()),
        ..Config::default()
    };
    let gate = AuthGate::from_config(&cfg).expect("gate should build with a secret");
    refri_router(RefriState::new(gate))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn sign(claims: &Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign token")
}

async fn get(uri: &str, authorization: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    app()
        .oneshot(builder.body(Body::empty()).expect("failed to build request"))
        .await
        .expect("request failed")
}

async fn body_bytes(resp: Response) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

#[tokio::test]
async fn health_needs_no_credential() {
    let resp = get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_header_is_401_without_body() {
    let resp = get("/api/session", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn malformed_headers_are_treated_as_missing() {
    for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer ", "token abc", "", "bearer abc"] {
        let resp = get("/api/session", Some(value)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header {value:?}");
        assert!(body_bytes(resp).await.is_empty());
    }
}

#[tokio::test]
async fn valid_token_round_trips_claims() {
    let claims = json!({
        "sub": "u1",
        "role": "cliente",
        "exp": now() + 3600,
        "iat": now(),
        "email": "u1@refri.example",
    });
    let token = sign(&claims, SECRET);

    let resp = get("/api/session", Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).expect("json body");
    assert_eq!(body, claims);
}

#[tokio::test]
async fn token_with_audience_round_trips_claims() {
    let claims = json!({
        "sub": "u1",
        "role": "admin",
        "exp": now() + 3600,
        "aud": "refri-web",
    });
    let token = sign(&claims, SECRET);

    let resp = get("/api/session", Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).expect("json body");
    assert_eq!(body, claims);
}

#[tokio::test]
async fn expired_token_is_403_without_body() {
    let token = sign(&json!({"sub": "u1", "role": "admin", "exp": now() - 60}), SECRET);
    let resp = get("/api/session", Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn foreign_signature_is_403_without_body() {
    let token = sign(&json!({"sub": "u1", "role": "admin", "exp": now() + 3600}), "not-S");
    let resp = get("/api/admin/overview", Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn garbage_token_is_403() {
    let resp = get("/api/session", Some("Bearer definitely.not.a-jwt")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_token_passes_role_gate() {
    let token = sign(&json!({"sub": "u1", "role": "admin", "exp": now() + 3600}), SECRET);
    let resp = get("/api/admin/overview", Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).expect("json body");
    assert_eq!(body, json!({"subject": "u1", "role": "admin"}));
}

#[tokio::test]
async fn other_roles_get_403_with_message() {
    for role in ["manager", "cliente", "Admin", ""] {
        let token = sign(&json!({"sub": "u2", "role": role, "exp": now() + 3600}), SECRET);
        let resp = get("/api/admin/overview", Some(&format!("Bearer {token}"))).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "role {role:?}");
        let body: Value = serde_json::from_slice(&body_bytes(resp).await).expect("json body");
        let message = body["error"].as_str().expect("error message");
        assert!(message.starts_with(ACCESS_DENIED_MESSAGE));
    }
}

#[tokio::test]
async fn same_admin_token_fails_a_manager_gate() {
    use axum::{middleware::from_fn_with_state, routing::get as get_route};
    use refri_express::middleware::auth::{RequiredRole, authenticate, require_role};

    let cfg = Config {
        jwt_secret: Some(SECRET.to_string()),
        ..Config::default()
    };
    let gate = AuthGate::from_config(&cfg).expect("gate");
    let app: Router = Router::new()
        .route("/reports", get_route(|| async { "ok" }))
        .route_layer(from_fn_with_state(RequiredRole::new("manager"), require_role))
        .route_layer(from_fn_with_state(gate, authenticate));

    let token = sign(&json!({"sub": "u1", "role": "admin", "exp": now() + 3600}), SECRET);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).expect("json body");
    assert!(!body["error"].as_str().unwrap_or_default().is_empty());
}

#[test]
fn startup_without_secret_is_fatal() {
    let err = AuthGate::from_config(&Config::default())
        .err()
        .expect("gate must not build without a secret");
    assert!(matches!(err, RefriError::MissingJwtSecret));
}

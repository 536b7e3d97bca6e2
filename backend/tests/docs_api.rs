use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use warden_backend::docs;

fn swagger_router() -> Router {
    let openapi = docs::ApiDoc::openapi();
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
}

#[test]
fn openapi_lists_auth_routes_and_security_schemes() {
    let openapi = docs::ApiDoc::openapi();
    let json = serde_json::to_value(&openapi).expect("serialize openapi");

    let paths = json
        .get("paths")
        .and_then(Value::as_object)
        .expect("paths object");
    for path in [
        "/v1/users/register",
        "/v1/user/login",
        "/v1/user/logout",
        "/v1/user/whoami",
        "/v1/role",
        "/v1/role/{role_id}/permission",
        "/v1/user/{user}/permission",
        "/v1/permission",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }

    let bearer = json
        .pointer("/components/securitySchemes/BearerAuth")
        .expect("BearerAuth scheme");
    assert_eq!(bearer.get("type").and_then(Value::as_str), Some("http"));
    assert_eq!(bearer.get("scheme").and_then(Value::as_str), Some("bearer"));

    let cookie = json
        .pointer("/components/securitySchemes/SessionCookie")
        .expect("SessionCookie scheme");
    assert_eq!(cookie.get("in").and_then(Value::as_str), Some("cookie"));
}

#[tokio::test]
async fn openapi_json_is_served() {
    let response = swagger_router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

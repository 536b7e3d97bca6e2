use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use serde_json::json;
use warden_backend::utils::jwt::{self, Audience, JwtPayload};

mod support;

use support::{
    cookie_pair, integration_guard, json_request, login_bearer, login_session, send, seed_user,
    test_app, test_config, test_pool, unique_name, with_bearer, with_session, TEST_PASSWORD,
};

#[tokio::test]
async fn register_then_duplicate_is_rejected() {
    let _guard = integration_guard().await;
    let app = test_app(test_pool().await);
    let name = unique_name("alice");
    let body = json!({
        "userName": name,
        "email": format!("{}@x.com", name),
        "password": "LongEnoughPw1",
    });

    let (status, _, created) = send(&app, json_request("POST", "/v1/users/register", body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["user"]["user_name"], name);

    let (status, _, rejected) = send(&app, json_request("POST", "/v1/users/register", body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(rejected["code"], "REGISTRATION_REJECTED");
    assert!(rejected["error"]
        .as_str()
        .unwrap_or_default()
        .contains("already taken"));
    assert!(rejected["errMsg"]
        .as_str()
        .unwrap_or_default()
        .contains("already taken"));
}

#[tokio::test]
async fn register_refuses_names_that_shadow_user_routes() {
    let _guard = integration_guard().await;
    let app = test_app(test_pool().await);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/users/register",
            json!({
                "userName": "whoami",
                "email": format!("{}@x.com", unique_name("whoami")),
                "password": "LongEnoughPw1",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["errMsg"]
        .as_str()
        .unwrap_or_default()
        .contains("reserved"));
}

#[tokio::test]
async fn register_with_unreadable_body_is_rejected() {
    let _guard = integration_guard().await;
    let app = test_app(test_pool().await);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/users/register",
            json!({ "userName": "alice", "email": "alice@x.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "REGISTRATION_REJECTED");
    assert!(body["errMsg"]
        .as_str()
        .unwrap_or_default()
        .contains("password"));

    let request = Request::builder()
        .method("POST")
        .uri("/v1/users/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "REGISTRATION_REJECTED");
}

#[tokio::test]
async fn register_with_bad_input_is_rejected() {
    let _guard = integration_guard().await;
    let app = test_app(test_pool().await);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/users/register",
            json!({ "userName": "x", "email": "not-an-email", "password": "short" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"]["errors"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;

    let (wrong_status, wrong_cookies, wrong_password) = send(
        &app,
        json_request(
            "POST",
            "/v1/user/login",
            json!({ "userName": user.user_name, "password": "wrong-password-here" }),
        ),
    )
    .await;
    let (unknown_status, _, unknown_user) = send(
        &app,
        json_request(
            "POST",
            "/v1/user/login",
            json!({ "userName": unique_name("ghost"), "password": TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["code"], "AUTH_FAILED");
    assert_eq!(wrong_password["message"], "Invalid username or password");
    assert!(cookie_pair(&wrong_cookies, "warden_sid").is_none());
}

#[tokio::test]
async fn login_with_unreadable_body_fails_like_bad_credentials() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;

    let (bad_status, _, bad_credentials) = send(
        &app,
        json_request(
            "POST",
            "/v1/user/login",
            json!({ "userName": user.user_name, "password": "wrong-password-here" }),
        ),
    )
    .await;
    let (missing_status, missing_cookies, missing_password) = send(
        &app,
        json_request("POST", "/v1/user/login", json!({ "userName": user.user_name })),
    )
    .await;

    assert_eq!(bad_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing_password, bad_credentials);
    assert!(cookie_pair(&missing_cookies, "warden_sid").is_none());

    let request = Request::builder()
        .method("POST")
        .uri("/v1/user/login")
        .body(Body::from("userName=alice"))
        .expect("request");
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password");
}

#[tokio::test]
async fn login_sets_cookies_and_whoami_resolves_the_session() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;

    let (status, cookies, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/user/login",
            json!({ "userName": user.user_name, "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_id"], user.user_id.as_str());
    assert!(body.get("token").is_none());

    let session_cookie = cookies
        .iter()
        .find(|cookie| cookie.starts_with("warden_sid="))
        .expect("session cookie");
    assert!(session_cookie.contains("HttpOnly"));
    let identity_cookie = cookies
        .iter()
        .find(|cookie| cookie.starts_with("warden_user="))
        .expect("identity cookie");
    assert!(identity_cookie.contains(&user.user_name));
    assert!(!identity_cookie.contains("HttpOnly"));

    let cookie = cookie_pair(&cookies, "warden_sid").expect("session pair");
    let (status, refreshed, me) = send(&app, with_session("GET", "/v1/user/whoami", &cookie, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["user_id"], user.user_id.as_str());
    assert!(cookie_pair(&refreshed, "warden_sid").is_some());
}

#[tokio::test]
async fn repeated_login_on_one_session_reuses_the_login_record() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;
    let cookie = login_session(&app, &user.user_name).await;

    let (status, _, _) = send(
        &app,
        with_session(
            "POST",
            "/v1/user/login",
            &cookie,
            Some(json!({ "userName": user.user_name, "password": TEST_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_login WHERE user_id = $1 AND logged_out = FALSE",
    )
    .bind(&user.user_id)
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(active, 1);
}

#[tokio::test]
async fn logout_ends_the_session_login() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;
    let cookie = login_session(&app, &user.user_name).await;

    let (status, cookies, body) = send(&app, with_session("POST", "/v1/user/logout", &cookie, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(cookies
        .iter()
        .any(|cookie| cookie.starts_with("warden_user=;") && cookie.contains("Max-Age=0")));

    let (status, _, _) = send(&app, with_session("GET", "/v1/user/whoami", &cookie, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (sid, _) = cookie
        .trim_start_matches("warden_sid=")
        .rsplit_once('.')
        .expect("signed sid");
    let owner: Option<String> = sqlx::query_scalar("SELECT user_id FROM session WHERE sid = $1")
        .bind(sid)
        .fetch_one(&pool)
        .await
        .expect("session row survives logout");
    assert_eq!(owner, None);
}

#[tokio::test]
async fn protected_routes_reject_anonymous_callers() {
    let _guard = integration_guard().await;
    let app = test_app(test_pool().await);

    let response_status = send(
        &app,
        Request::builder()
            .uri("/v1/user/whoami")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .0;
    assert_eq!(response_status, StatusCode::UNAUTHORIZED);

    let forged = send(
        &app,
        Request::builder()
            .uri("/v1/user/whoami")
            .header(header::COOKIE, "warden_sid=forged-session.bad-signature")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(forged.0, StatusCode::UNAUTHORIZED);
    assert!(cookie_pair(&forged.1, "warden_sid").is_none());
}

#[tokio::test]
async fn with_jwt_login_issues_a_usable_bearer_token() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;

    let token = login_bearer(&app, &user.user_name).await;
    let decoded = jwt::decode(&token).expect("decode");
    assert_eq!(decoded.payload.user_id.as_deref(), Some(user.user_id.as_str()));

    let (status, _, me) = send(&app, with_bearer("GET", "/v1/user/whoami", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["user_name"], user.user_name);
}

#[tokio::test]
async fn expired_or_foreign_tokens_are_rejected() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;
    let config = test_config();
    let now = Utc::now().timestamp();

    let expired = jwt::sign(
        JwtPayload {
            iss: Some(config.jwt_issuer.clone()),
            aud: Some(Audience::One(config.jwt_audience.clone())),
            iat: Some(now - 120),
            exp: Some(now - 60),
            user_id: Some(user.user_id.to_string()),
            ..Default::default()
        },
        config.jwt_secret.as_bytes(),
    )
    .expect("sign");
    let (status, _, _) = send(&app, with_bearer("GET", "/v1/user/whoami", &expired, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = jwt::sign(
        JwtPayload {
            iss: Some(config.jwt_issuer.clone()),
            aud: Some(Audience::One(config.jwt_audience.clone())),
            exp: Some(now + 600),
            user_id: Some(user.user_id.to_string()),
            ..Default::default()
        },
        b"some-other-secret",
    )
    .expect("sign");
    let (status, _, _) = send(&app, with_bearer("GET", "/v1/user/whoami", &foreign, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_audience = jwt::sign(
        JwtPayload {
            iss: Some(config.jwt_issuer.clone()),
            aud: Some(Audience::One("someone-else".into())),
            exp: Some(now + 600),
            user_id: Some(user.user_id.to_string()),
            ..Default::default()
        },
        config.jwt_secret.as_bytes(),
    )
    .expect("sign");
    let (status, _, _) =
        send(&app, with_bearer("GET", "/v1/user/whoami", &wrong_audience, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_profile_hides_email() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let user = seed_user(&pool).await;

    let (status, _, body) = send(
        &app,
        Request::builder()
            .uri(format!("/v1/user/{}", user.user_name))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_name"], user.user_name);
    assert!(body["user"].get("email").is_none());

    let (status, _, _) = send(
        &app,
        Request::builder()
            .uri(format!("/v1/user/{}", unique_name("ghost")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

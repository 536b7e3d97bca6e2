use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    docs::ApiDoc,
    handlers::{auth, authz, health, users},
    middleware,
    state::AppState,
};

/// Full application router, shared by the server and the integration tests.
pub fn app_router(state: AppState) -> Router {
    let require_auth = from_fn_with_state(state.clone(), middleware::auth);

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/v1/users/register", post(auth::register))
        .route("/v1/user/login", post(auth::login))
        // DELETE needs a caller; the GET lookup is public. Static siblings
        // (`login`, `logout`, `whoami`) win, so those names are reserved.
        .route(
            "/v1/user/{user}",
            delete(users::delete_user)
                .route_layer(require_auth.clone())
                .get(users::get_public_user),
        );

    let protected = Router::new()
        .route("/v1/user/logout", post(auth::logout))
        .route("/v1/user/whoami", get(auth::whoami))
        .route("/v1/users", post(users::create_user))
        .route("/v1/user/{user}/password", post(users::change_password))
        .route(
            "/v1/user/{user}/role",
            get(users::get_user_roles).post(users::assign_roles),
        )
        .route(
            "/v1/user/{user}/permission",
            get(users::get_user_permissions),
        )
        .route(
            "/v1/user/{user}/role/{role_name}",
            delete(users::remove_role),
        )
        .route("/v1/role", get(authz::get_roles).post(authz::create_role))
        .route("/v1/role/{role_id}", delete(authz::delete_role))
        .route(
            "/v1/role/{role_id}/permission",
            get(authz::get_role_permissions),
        )
        .route(
            "/v1/permission",
            get(authz::get_permissions).post(authz::create_permission),
        )
        .route_layer(require_auth);

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(state.clone(), middleware::session))
        .layer(from_fn(middleware::log_error_responses))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .layer(from_fn(middleware::request_id))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    handlers::{health::HealthResponse, users::UserRolesQuery, SuccessResponse},
    models::{
        role::{
            AssignRolesRequest, CreatePermissionRequest, CreateRoleRequest, PermissionResponse,
            RoleQuery, RoleResponse,
        },
        user::{
            ChangePasswordRequest, CreateUserRequest, LoginQuery, LoginRequest, LoginResponse,
            PublicUser, PublicUserResponse, RegisterRequest, User, UserResponse,
        },
    },
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        register_doc,
        login_doc,
        logout_doc,
        whoami_doc,
        create_user_doc,
        public_user_doc,
        delete_user_doc,
        change_password_doc,
        user_roles_doc,
        user_permissions_doc,
        assign_roles_doc,
        remove_role_doc,
        get_roles_doc,
        create_role_doc,
        delete_role_doc,
        role_permissions_doc,
        get_permissions_doc,
        create_permission_doc
    ),
    components(
        schemas(
            ErrorResponse,
            SuccessResponse,
            HealthResponse,
            // users
            User,
            PublicUser,
            UserResponse,
            PublicUserResponse,
            RegisterRequest,
            CreateUserRequest,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            // rbac
            RoleResponse,
            PermissionResponse,
            CreateRoleRequest,
            CreatePermissionRequest,
            AssignRolesRequest
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Registration, login and session identity"),
        (name = "Users", description = "Account management"),
        (name = "Roles", description = "Roles and permissions")
    ),
    security(("BearerAuth" = []), ("SessionCookie" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("warden_sid"))),
        );
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Auth",
    security(())
)]
fn health_doc() {}

#[utoipa::path(
    post,
    path = "/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 403, description = "Input rejected or name taken; `errMsg` summarises why", body = ErrorResponse)
    ),
    tag = "Auth",
    security(())
)]
fn register_doc() {}

#[utoipa::path(
    post,
    path = "/v1/user/login",
    params(LoginQuery),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; sets the session and identity cookies", body = LoginResponse),
        (status = 401, description = "Invalid username or password, or an unreadable body", body = ErrorResponse)
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/v1/user/logout",
    responses(
        (status = 200, description = "Login ended", body = SuccessResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/v1/user/whoami",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Auth"
)]
fn whoami_doc() {}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Requires user.create", body = ErrorResponse)
    ),
    tag = "Users"
)]
fn create_user_doc() {}

#[utoipa::path(
    get,
    path = "/v1/user/{user}",
    params(("user" = String, Path, description = "User name")),
    responses(
        (status = 200, description = "Public profile", body = PublicUserResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    tag = "Users",
    security(())
)]
fn public_user_doc() {}

#[utoipa::path(
    delete,
    path = "/v1/user/{user}",
    params(("user" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Account deleted", body = SuccessResponse),
        (status = 403, description = "Requires user.mgmt", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    tag = "Users"
)]
fn delete_user_doc() {}

#[utoipa::path(
    post,
    path = "/v1/user/{user}/password",
    params(("user" = String, Path, description = "User id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Wrong current password or requires user.mgmt", body = ErrorResponse)
    ),
    tag = "Users"
)]
fn change_password_doc() {}

#[utoipa::path(
    get,
    path = "/v1/user/{user}/role",
    params(("user" = String, Path, description = "User id"), UserRolesQuery),
    responses(
        (status = 200, description = "Roles held by the user", body = [RoleResponse]),
        (status = 403, description = "Requires user.mgmt for other users", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn user_roles_doc() {}

#[utoipa::path(
    get,
    path = "/v1/user/{user}/permission",
    params(("user" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Union of the permissions of the user's roles", body = [PermissionResponse]),
        (status = 403, description = "Requires user.mgmt for other users", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn user_permissions_doc() {}

#[utoipa::path(
    post,
    path = "/v1/user/{user}/role",
    params(("user" = String, Path, description = "User id")),
    request_body = AssignRolesRequest,
    responses(
        (status = 200, description = "Roles assigned", body = SuccessResponse),
        (status = 403, description = "Requires user.mgmt", body = ErrorResponse),
        (status = 404, description = "Unknown user or role", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn assign_roles_doc() {}

#[utoipa::path(
    delete,
    path = "/v1/user/{user}/role/{role_name}",
    params(
        ("user" = String, Path, description = "User id"),
        ("role_name" = String, Path, description = "Role name")
    ),
    responses(
        (status = 200, description = "Role removed", body = SuccessResponse),
        (status = 403, description = "Requires user.mgmt", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn remove_role_doc() {}

#[utoipa::path(
    get,
    path = "/v1/role",
    params(RoleQuery),
    responses(
        (status = 200, description = "A role when `name` is given, otherwise all roles", body = [RoleResponse]),
        (status = 403, description = "Requires role.read", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn get_roles_doc() {}

#[utoipa::path(
    post,
    path = "/v1/role",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Created or existing role", body = RoleResponse),
        (status = 403, description = "Requires role.create", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn create_role_doc() {}

#[utoipa::path(
    delete,
    path = "/v1/role/{role_id}",
    params(("role_id" = i32, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted", body = SuccessResponse),
        (status = 403, description = "Requires role.delete", body = ErrorResponse),
        (status = 404, description = "No such role", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn delete_role_doc() {}

#[utoipa::path(
    get,
    path = "/v1/role/{role_id}/permission",
    params(("role_id" = i32, Path, description = "Role id")),
    responses(
        (status = 200, description = "Permissions granted by the role", body = [PermissionResponse]),
        (status = 403, description = "Requires role.read", body = ErrorResponse),
        (status = 404, description = "No such role", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn role_permissions_doc() {}

#[utoipa::path(
    get,
    path = "/v1/permission",
    responses(
        (status = 200, description = "All permissions", body = [PermissionResponse]),
        (status = 403, description = "Requires permission.read", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn get_permissions_doc() {}

#[utoipa::path(
    post,
    path = "/v1/permission",
    request_body = CreatePermissionRequest,
    responses(
        (status = 200, description = "Created or existing permission", body = PermissionResponse),
        (status = 403, description = "Requires permission.create", body = ErrorResponse)
    ),
    tag = "Roles"
)]
fn create_permission_doc() {}

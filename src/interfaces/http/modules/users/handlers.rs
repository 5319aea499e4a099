//! User API handlers
//!
//! Registration is public; everything else requires a token and is limited
//! to the account owner or an admin.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{resolve_user_id, RegisterRequest, UpdateUserRequest, UserDto};
use crate::application::{ReservationService, UserService};
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ItemsResponse, TokenResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::reservations::ReservationDto;

#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
    pub reservation_service: Arc<ReservationService>,
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered and signed in", body = ApiResponse<TokenResponse>),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>), ApiError> {
    let auth = state
        .user_service
        .register(&request.username, &request.email, &request.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TokenResponse { token: auth.token })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = ApiResponse<ItemsResponse<UserDto>>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<ItemsResponse<UserDto>>>, ApiError> {
    caller.require_admin()?;
    let users = state.user_service.get_all().await?;
    Ok(Json(ApiResponse::success(ItemsResponse::new(
        users.into_iter().map(UserDto::from).collect(),
    ))))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id or `me`")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = resolve_user_id(&id, &caller)?;
    caller.ensure_access(id)?;
    let user = state.user_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id or `me`")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "No such user")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = resolve_user_id(&id, &caller)?;
    caller.ensure_access(id)?;
    let user = state.user_service.update(id, request.into()).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id or `me`")),
    responses(
        (status = 204, description = "User and their reservations deleted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = resolve_user_id(&id, &caller)?;
    caller.ensure_access(id)?;
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/reservations",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id or `me`")),
    responses(
        (status = 200, description = "Reservations of the user", body = ApiResponse<ItemsResponse<ReservationDto>>),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_user_reservations(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ItemsResponse<ReservationDto>>>, ApiError> {
    let id = resolve_user_id(&id, &caller)?;
    caller.ensure_access(id)?;
    let reservations = state.reservation_service.list_by_user(id).await?;
    Ok(Json(ApiResponse::success(ItemsResponse::new(
        reservations.into_iter().map(ReservationDto::from).collect(),
    ))))
}

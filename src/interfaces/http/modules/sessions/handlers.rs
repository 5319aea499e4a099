//! Login handler

use std::sync::Arc;

use axum::{extract::State, Json};

use super::dto::LoginRequest;
use crate::application::UserService;
use crate::interfaces::http::common::{ApiError, ApiResponse, TokenResponse, ValidatedJson};

#[derive(Clone)]
pub struct SessionState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<TokenResponse>),
        (status = 401, description = "The given email and password do not match"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<SessionState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let auth = state
        .user_service
        .login(&request.email, &request.password)
        .await?;
    let body = TokenResponse { token: auth.token };
    Ok(Json(ApiResponse::success(body)))
}

//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::{DomainError, Role};
use crate::infrastructure::crypto::jwt::{token_error, verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::error::SIGN_IN_REQUIRED;
use crate::interfaces::http::common::ApiError;

/// Authentication state containing the JWT settings
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            user_id: claims.user_id()?,
            roles: claims.roles,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Admins may touch anything, everyone else only what they own.
    pub fn can_access(&self, owner_id: i32) -> bool {
        self.is_admin() || self.user_id == owner_id
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    pub fn ensure_access(&self, owner_id: i32) -> Result<(), ApiError> {
        if self.can_access(owner_id) {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    /// Owner filter for reservation queries: `None` for admins.
    pub fn scope(&self) -> Option<i32> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(DomainError::Unauthorized(SIGN_IN_REQUIRED.into()));
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(DomainError::Unauthorized(
            "Invalid authentication token".into(),
        ));
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => match AuthenticatedUser::from_claims(claims) {
            Some(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            None => auth_error_response(DomainError::Unauthorized(
                "Invalid authentication token".into(),
            )),
        },
        Err(e) => auth_error_response(token_error(&e)),
    }
}

fn auth_error_response(error: DomainError) -> Response {
    ApiError(error).into_response()
}

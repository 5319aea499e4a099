//! Reservation handlers
//!
//! Non-admin callers only ever see their own reservations; someone else's
//! reservation answers 404 exactly like a missing one.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ReservationDto, ReservationRequest};
use crate::application::{Booking, ReservationChange, ReservationService};
use crate::interfaces::http::common::{ApiError, ApiResponse, ItemsResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ReservationHandlerState {
    pub reservation_service: Arc<ReservationService>,
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visible reservations", body = ApiResponse<ItemsResponse<ReservationDto>>))
)]
pub async fn list_reservations(
    State(state): State<ReservationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<ItemsResponse<ReservationDto>>>, ApiError> {
    let reservations = state.reservation_service.get_all(caller.scope()).await?;
    Ok(Json(ApiResponse::success(ItemsResponse::new(
        reservations.into_iter().map(ReservationDto::from).collect(),
    ))))
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation admitted", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Start is not before end"),
        (status = 403, description = "No available spaces at the station"),
        (status = 404, description = "No such user or station"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationDto>>), ApiError> {
    let reservation = state
        .reservation_service
        .create(Booking {
            charging_station_id: request.charging_station_id,
            user_id: caller.user_id,
            start: request.start_reservation,
            end: request.end_reservation,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reservation.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 404, description = "No reservation with this id exists")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ReservationDto>>, ApiError> {
    let reservation = state
        .reservation_service
        .get_by_id(id, caller.scope())
        .await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    put,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation id")),
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation replaced", body = ApiResponse<ReservationDto>),
        (status = 403, description = "No available spaces at the station"),
        (status = 404, description = "No such reservation, user or station")
    )
)]
pub async fn update_reservation(
    State(state): State<ReservationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<Json<ApiResponse<ReservationDto>>, ApiError> {
    let reservation = state
        .reservation_service
        .update(
            id,
            caller.scope(),
            ReservationChange {
                charging_station_id: request.charging_station_id,
                start: request.start_reservation,
                end: request.end_reservation,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation id")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "No reservation with this id exists")
    )
)]
pub async fn delete_reservation(
    State(state): State<ReservationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.reservation_service.delete(id, caller.scope()).await?;
    Ok(StatusCode::NO_CONTENT)
}

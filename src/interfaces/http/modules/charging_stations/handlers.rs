//! Charging station handlers
//!
//! Reads are open to any signed-in user; writes are admin only.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ChargingStationDto, ChargingStationRequest};
use crate::application::StationService;
use crate::interfaces::http::common::{ApiError, ApiResponse, ItemsResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct StationHandlerState {
    pub station_service: Arc<StationService>,
}

#[utoipa::path(
    get,
    path = "/api/chargingStations",
    tag = "Charging Stations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All stations", body = ApiResponse<ItemsResponse<ChargingStationDto>>))
)]
pub async fn list_stations(
    State(state): State<StationHandlerState>,
) -> Result<Json<ApiResponse<ItemsResponse<ChargingStationDto>>>, ApiError> {
    let stations = state.station_service.get_all().await?;
    Ok(Json(ApiResponse::success(ItemsResponse::new(
        stations.into_iter().map(ChargingStationDto::from).collect(),
    ))))
}

#[utoipa::path(
    get,
    path = "/api/chargingStations/{id}",
    tag = "Charging Stations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station", body = ApiResponse<ChargingStationDto>),
        (status = 404, description = "No such station")
    )
)]
pub async fn get_station(
    State(state): State<StationHandlerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ChargingStationDto>>, ApiError> {
    let station = state.station_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    post,
    path = "/api/chargingStations",
    tag = "Charging Stations",
    security(("bearer_auth" = [])),
    request_body = ChargingStationRequest,
    responses(
        (status = 201, description = "Station created", body = ApiResponse<ChargingStationDto>),
        (status = 403, description = "Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_station(
    State(state): State<StationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ChargingStationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChargingStationDto>>), ApiError> {
    caller.require_admin()?;
    let station = state.station_service.create(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(station.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/chargingStations/{id}",
    tag = "Charging Stations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Station id")),
    request_body = ChargingStationRequest,
    responses(
        (status = 200, description = "Station replaced", body = ApiResponse<ChargingStationDto>),
        (status = 404, description = "No such station")
    )
)]
pub async fn update_station(
    State(state): State<StationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ChargingStationRequest>,
) -> Result<Json<ApiResponse<ChargingStationDto>>, ApiError> {
    caller.require_admin()?;
    let station = state.station_service.update(id, request.into()).await?;
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    delete,
    path = "/api/chargingStations/{id}",
    tag = "Charging Stations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 204, description = "Station and its reservations deleted"),
        (status = 404, description = "No such station")
    )
)]
pub async fn delete_station(
    State(state): State<StationHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    caller.require_admin()?;
    state.station_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! API Router with Swagger UI

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{ReservationService, StationService, UserService};
use crate::config::CorsConfig;
use crate::domain::Role;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, ItemsResponse, TokenResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    charging_stations, health, metrics, request_id, reservations, sessions, users,
};

/// Services and settings the HTTP layer is built from
#[derive(Clone)]
pub struct ApiContext {
    pub db: DatabaseConnection,
    pub jwt_config: JwtConfig,
    pub user_service: Arc<UserService>,
    pub station_service: Arc<StationService>,
    pub reservation_service: Arc<ReservationService>,
    pub cors: CorsConfig,
    /// Reported by `/health/version`
    pub env: String,
    /// `/metrics` is mounted only when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/sessions or POST /api/users"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::ping,
        health::version,
        health::health_check,
        // Sessions
        sessions::login,
        // Users
        users::register,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_user_reservations,
        // Charging stations
        charging_stations::list_stations,
        charging_stations::get_station,
        charging_stations::create_station,
        charging_stations::update_station,
        charging_stations::delete_station,
        // Reservations
        reservations::list_reservations,
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::update_reservation,
        reservations::delete_reservation,
    ),
    components(
        schemas(
            ApiResponse<String>,
            ItemsResponse<reservations::ReservationDto>,
            TokenResponse,
            Role,
            health::PingResponse,
            health::VersionResponse,
            health::HealthResponse,
            health::ComponentHealth,
            sessions::LoginRequest,
            users::UserDto,
            users::RegisterRequest,
            users::UpdateUserRequest,
            charging_stations::ChargingStationDto,
            charging_stations::ChargingStationRequest,
            reservations::ReservationDto,
            reservations::ReservationRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness, version and database checks"),
        (name = "Sessions", description = "Sign in with email and password"),
        (name = "Users", description = "Registration, profiles and per-user reservations"),
        (name = "Charging Stations", description = "Stations and their capacity"),
        (name = "Reservations", description = "Capacity-checked bookings"),
    ),
    info(
        title = "EV Reserve API",
        version = "1.0.0",
        description = "Reservations for electric-vehicle charging stations"
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age_secs))
}

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };
    let auth = || middleware::from_fn_with_state(auth_state.clone(), auth_middleware);

    // ── Health (public) ────────────────────────────────────────
    let health_routes = Router::new()
        .route("/", get(health::health_check))
        .route("/ping", get(health::ping))
        .route("/version", get(health::version))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            started_at: Arc::new(Instant::now()),
            env: ctx.env.clone(),
        });

    // ── Sessions (public) ──────────────────────────────────────
    let session_routes = Router::new()
        .route("/", post(sessions::login))
        .with_state(sessions::SessionState {
            user_service: ctx.user_service.clone(),
        });

    // ── Users: registration public, the rest protected ─────────
    let user_state = users::UserHandlerState {
        user_service: ctx.user_service.clone(),
        reservation_service: ctx.reservation_service.clone(),
    };
    let user_public = Router::new().route("/", post(users::register));
    let user_protected = Router::new()
        .route("/", get(users::list_users))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/reservations", get(users::list_user_reservations))
        .layer(auth());
    let user_routes = user_public.merge(user_protected).with_state(user_state);

    // ── Charging stations (protected) ──────────────────────────
    let station_routes = Router::new()
        .route(
            "/",
            get(charging_stations::list_stations).post(charging_stations::create_station),
        )
        .route(
            "/{id}",
            get(charging_stations::get_station)
                .put(charging_stations::update_station)
                .delete(charging_stations::delete_station),
        )
        .layer(auth())
        .with_state(charging_stations::StationHandlerState {
            station_service: ctx.station_service.clone(),
        });

    // ── Reservations (protected) ───────────────────────────────
    let reservation_routes = Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/{id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .layer(auth())
        .with_state(reservations::ReservationHandlerState {
            reservation_service: ctx.reservation_service.clone(),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .nest("/health", health_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/users", user_routes)
        .nest("/api/chargingStations", station_routes)
        .nest("/api/reservations", reservation_routes);

    if let Some(handle) = ctx.metrics {
        router = router.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors_layer(&ctx.cors))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::StationLocks;
    use crate::config::AdminConfig;
    use crate::domain::RepositoryProvider;
    use crate::infrastructure::database::test_database;
    use crate::infrastructure::SeaOrmRepositoryProvider;

    const ADMIN_EMAIL: &str = "admin@ev-reserve.local";
    const ADMIN_PASSWORD: &str = "admin12345";

    async fn app() -> Router {
        let db = test_database().await;
        let provider = SeaOrmRepositoryProvider::new(db.clone());
        let repos: Arc<dyn RepositoryProvider> = Arc::new(provider);
        let jwt_config = JwtConfig::default();
        let locks = StationLocks::new();

        let users = UserService::new(repos.clone(), jwt_config.clone()).with_bcrypt_cost(4);
        let user_service = Arc::new(users);
        let admin = AdminConfig::default();
        user_service.seed_admin(&admin).await.unwrap();

        create_api_router(ApiContext {
            db,
            jwt_config,
            user_service,
            station_service: Arc::new(StationService::new(repos.clone(), locks.clone())),
            reservation_service: Arc::new(ReservationService::new(repos, locks)),
            cors: CorsConfig::default(),
            env: "test".into(),
            metrics: None,
        })
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                req = req.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/sessions",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn register(app: &Router, name: &str) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/users",
            None,
            Some(json!({
                "username": name,
                "email": format!("{}@example.com", name),
                "password": "12345678"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn station(app: &Router, admin: &str, spaces: Value) -> i64 {
        let (status, body) = call(
            app,
            "POST",
            "/api/chargingStations",
            Some(admin),
            Some(json!({"numberOfSpaces": spaces})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    fn booking(station: i64, start: &str, end: &str) -> Value {
        json!({
            "chargingStation_id": station,
            "startReservation": format!("2099-06-01T{}:00Z", start),
            "endReservation": format!("2099-06-01T{}:00Z", end)
        })
    }

    #[tokio::test]
    async fn health_endpoints_are_public() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/health/ping", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pong"], true);

        let (_, body) = call(&app, "GET", "/health/version", None, None).await;
        assert_eq!(body["env"], "test");

        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/api/reservations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "You need to be signed in");

        let (status, _) = call(&app, "GET", "/api/reservations", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_gets_the_uniform_message() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/sessions",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": "not-it"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "The given email and password do not match");
    }

    #[tokio::test]
    async fn only_admins_manage_stations() {
        let app = app().await;
        let user = register(&app, "tess").await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/chargingStations",
            Some(&user),
            Some(json!({"numberOfSpaces": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/chargingStations",
            Some(&admin),
            Some(json!({"numberOfSpaces": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn booking_flow_enforces_capacity() {
        let app = app().await;
        let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let user = register(&app, "omar").await;
        let single = station(&app, &admin, json!(1)).await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(single, "10:00", "12:00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["username"], "omar");

        let (status, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(single, "12:00", "14:00")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains(&format!("charging station {}", single)));

        let (status, _) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(single, "12:01", "13:00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(9999, "10:00", "12:00")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "There is no chargingStation with id 9999.");

        let (status, _) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(single, "15:00", "14:00")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn past_dates_are_rejected() {
        let app = app().await;
        let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let id = station(&app, &admin, Value::Null).await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&admin),
            Some(json!({
                "chargingStation_id": id,
                "startReservation": "2000-01-01T10:00:00Z",
                "endReservation": "2000-01-01T11:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn reservations_are_private_to_their_owner() {
        let app = app().await;
        let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let alice = register(&app, "alice").await;
        let bob = register(&app, "bob").await;
        let open = station(&app, &admin, Value::Null).await;

        let (_, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&alice),
            Some(booking(open, "10:00", "12:00")),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/reservations/{}", id);

        let (status, body) = call(&app, "GET", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No reservation with this id exists");

        let (_, body) = call(&app, "GET", "/api/reservations", Some(&bob), None).await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);

        let (_, body) = call(&app, "GET", "/api/reservations", Some(&admin), None).await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

        let (status, _) = call(&app, "DELETE", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn update_rechecks_capacity() {
        let app = app().await;
        let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let user = register(&app, "kim").await;
        let single = station(&app, &admin, json!(1)).await;

        let (_, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(single, "10:00", "12:00")),
        )
        .await;
        let first = body["data"]["id"].as_i64().unwrap();
        call(
            &app,
            "POST",
            "/api/reservations",
            Some(&user),
            Some(booking(single, "14:00", "16:00")),
        )
        .await;

        let uri = format!("/api/reservations/{}", first);
        let earlier = booking(single, "09:00", "11:00");
        let (status, _) = call(&app, "PUT", &uri, Some(&user), Some(earlier)).await;
        assert_eq!(status, StatusCode::OK);

        let clashing = booking(single, "15:00", "17:00");
        let (status, _) = call(&app, "PUT", &uri, Some(&user), Some(clashing)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn me_alias_and_user_listing() {
        let app = app().await;
        let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let user = register(&app, "ruth").await;

        let (status, body) = call(&app, "GET", "/api/users/me", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "ruth");
        assert!(body["data"].get("password_hash").is_none());
        let own_id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = call(&app, "GET", "/api/users/1", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app, "GET", "/api/users", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = call(&app, "GET", "/api/users", Some(&admin), None).await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

        let own = "/api/users/me/reservations";
        let (status, body) = call(&app, "GET", own, Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["items"].as_array().unwrap().is_empty());

        let uri = format!("/api/users/{}", own_id);
        let rename = json!({"username": "ruth b"});
        let (status, body) = call(&app, "PUT", &uri, Some(&user), Some(rename)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "ruth b");

        let (status, _) = call(&app, "DELETE", &uri, Some(&user), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = call(&app, "GET", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["error"],
            format!("There is no user with id {}.", own_id)
        );
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = app().await;
        let req = Request::builder()
            .uri("/health/ping")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()["x-request-id"], "abc-123");
    }
}

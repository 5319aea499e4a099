//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>` and then runs
//! `validator::Validate::validate()` on the result. Malformed JSON is a 400,
//! a body that parses but fails validation is a 422 listing each field.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiResponse;

/// An extractor that deserializes JSON and validates it.
///
/// ```ignore
/// async fn create(ValidatedJson(body): ValidatedJson<StationRequest>) {
///     // `body` passed validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

impl ValidatedJsonRejection {
    /// `field: message` pairs, sorted by field name.
    fn field_messages(errors: &validator::ValidationErrors) -> Vec<String> {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, msg)
                })
            })
            .collect();
        messages.sort();
        messages
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                let message = format!("Invalid JSON: {}", rejection.body_text());
                let body = ApiResponse::<()>::error(message);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::ValidationError(errors) => {
                let fields = Self::field_messages(&errors);
                let message = if fields.is_empty() {
                    "Validation failed".to_string()
                } else {
                    fields.join("; ")
                };
                let body = ApiResponse::<()>::error(message);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct SpacesBody {
        #[validate(range(min = 1, message = "must be at least 1"))]
        spaces: i32,
        #[validate(length(max = 8))]
        label: String,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<SpacesBody>) -> &'static str {
        "ok"
    }

    async fn send(body: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/spaces", post(handler));
        let req = Request::builder()
            .method("POST")
            .uri("/spaces")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let (status, _) = send(r#"{"spaces": 2, "label": "north"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (status, json) = send("spaces=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn failed_validation_is_422_with_field_messages() {
        let (status, json) = send(r#"{"spaces": 0, "label": "far-too-long"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with("label: "));
        assert!(error.contains("spaces: must be at least 1"));
    }
}

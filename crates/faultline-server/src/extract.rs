use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use faultline_core::{ErrorDetails, StructuredError};
use http::HeaderMap;
use http::request::Parts;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::boundary::HandlerError;

/// JSON request body extractor with catalog rejections
///
/// Rejects with `missing_header`/`invalid_header` when the content type is
/// absent or not JSON, `missing_body` for an empty body, `invalid_json` for
/// malformed JSON and `invalid_input` when the JSON does not match `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HandlerError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        check_content_type(request.headers())?;

        let bytes = Bytes::from_request(request, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "failed to buffer request body");
            StructuredError::bad_request()
        })?;

        if bytes.is_empty() {
            return Err(StructuredError::missing_body().into());
        }

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            if e.classify() == serde_json::error::Category::Data {
                StructuredError::invalid_input(Some(details([("reason", Value::from(e.to_string()))])))
            } else {
                StructuredError::invalid_json()
            }
        })?;

        Ok(Self(value))
    }
}

/// Path parameter extractor with catalog rejections
///
/// Parameters that fail to deserialize reject with `invalid_input` and a
/// `reason` detail. Any other rejection is a routing bug and becomes
/// `internal_error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParams<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => Err(StructuredError::invalid_input(Some(
                details([("reason", Value::from(e.body_text()))]),
            ))
            .into()),
            Err(rejection) => Err(anyhow::anyhow!("path parameters unavailable: {}", rejection.body_text()).into()),
        }
    }
}

fn check_content_type(headers: &HeaderMap) -> Result<(), StructuredError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Err(StructuredError::missing_header(Some(details([
            ("key", Value::from("content-type")),
            ("expected", Value::from("application/json")),
        ]))));
    };

    let raw = value.to_str().unwrap_or_default();
    let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    if essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json")) {
        return Ok(());
    }

    Err(StructuredError::invalid_header(Some(details([
        ("key", Value::from("content-type")),
        ("value", Value::from(raw)),
    ]))))
}

fn details<const N: usize>(entries: [(&str, Value); N]) -> ErrorDetails {
    entries.into_iter().map(|(key, value)| (key.to_owned(), value)).collect()
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::response::Response;
    use axum::routing::{get, post};
    use http::StatusCode;
    use serde::Deserialize;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Widget {
        name: String,
    }

    async fn create(JsonBody(widget): JsonBody<Widget>) -> String {
        widget.name
    }

    async fn send(content_type: Option<&str>, body: &'static str) -> Response {
        let mut request = http::Request::post("/widgets");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        Router::new()
            .route("/widgets", post(create))
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    async fn show(PathParams(id): PathParams<u32>) -> String {
        id.to_string()
    }

    async fn fetch(uri: &str) -> Response {
        Router::new()
            .route("/widgets/{id}", get(show))
            .oneshot(http::Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_json() {
        let response = send(Some("application/json; charset=utf-8"), r#"{"name":"sprocket"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"sprocket");
    }

    #[tokio::test]
    async fn accepts_structured_json_suffix() {
        let response = send(Some("application/vnd.widget+json"), r#"{"name":"cog"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_content_type() {
        let response = send(None, r#"{"name":"sprocket"}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "errorCode": "missing_header",
                "errorMessage": "The request is missing a required header.",
                "errorDetails": { "key": "content-type", "expected": "application/json" }
            })
        );
    }

    #[tokio::test]
    async fn wrong_content_type() {
        let response = send(Some("text/plain"), "sprocket").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "errorCode": "invalid_header",
                "errorMessage": "The request specified an invalid header.",
                "errorDetails": { "key": "content-type", "value": "text/plain" }
            })
        );
    }

    #[tokio::test]
    async fn empty_body() {
        let response = send(Some("application/json"), "").await;

        assert_eq!(body_json(response).await["errorCode"], "missing_body");
    }

    #[tokio::test]
    async fn malformed_json() {
        let response = send(Some("application/json"), "{\"name\":").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "errorCode": "invalid_json",
                "errorMessage": "The request body does not contain valid JSON."
            })
        );
    }

    #[tokio::test]
    async fn wrong_shape() {
        let response = send(Some("application/json"), r#"{"name": 7}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errorCode"], "invalid_input");
        assert!(body["errorDetails"]["reason"].as_str().unwrap().contains("invalid type"));
    }

    #[tokio::test]
    async fn path_params_parse() {
        let response = fetch("/widgets/42").await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"42");
    }

    #[tokio::test]
    async fn unparsable_path_param_is_invalid_input() {
        let response = fetch("/widgets/abc").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["errorCode"], "invalid_input");
        assert_eq!(body["errorMessage"], "The request specified an invalid input.");
        assert!(body["errorDetails"]["reason"].as_str().unwrap().contains("abc"));
    }
}

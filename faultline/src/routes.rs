//! Demo routes, one per kind of failure

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use faultline_core::{ErrorDetails, ErrorOptions, StructuredError};
use faultline_server::{HandlerError, JsonBody, PathParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const WIDGETS: [&str; 3] = ["sprocket", "cog", "flange"];

#[derive(Debug, Serialize)]
struct Widget {
    id: usize,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewWidget {
    name: String,
    #[serde(default)]
    quantity: Option<u32>,
}

/// Routes mounted by the demo binary
pub fn router() -> Router {
    Router::new()
        .route("/widgets", get(list_widgets).post(create_widget))
        .route("/widgets/{id}", get(get_widget))
        .route("/legacy", get(legacy))
        .route("/reports", get(reports))
        .route("/teapot", get(teapot))
        .route("/admin", get(admin))
}

async fn list_widgets() -> axum::Json<Vec<Widget>> {
    let widgets = WIDGETS
        .iter()
        .enumerate()
        .map(|(id, name)| Widget {
            id,
            name: (*name).to_owned(),
        })
        .collect();

    axum::Json(widgets)
}

async fn get_widget(PathParams(id): PathParams<usize>) -> Result<axum::Json<Widget>, HandlerError> {
    let name = WIDGETS.get(id).ok_or_else(StructuredError::not_found)?;

    Ok(axum::Json(Widget {
        id,
        name: (*name).to_owned(),
    }))
}

async fn create_widget(JsonBody(widget): JsonBody<NewWidget>) -> Result<(StatusCode, axum::Json<Widget>), HandlerError> {
    if widget.name.trim().is_empty() {
        return Err(StructuredError::missing_input(Some(details("name", Value::from("a non-empty string")))).into());
    }

    if widget.quantity == Some(0) {
        return Err(StructuredError::invalid_input(Some(details("quantity", Value::from("must be at least 1")))).into());
    }

    Ok((
        StatusCode::CREATED,
        axum::Json(Widget {
            id: WIDGETS.len(),
            name: widget.name,
        }),
    ))
}

async fn legacy() -> HandlerError {
    StructuredError::gone().into()
}

async fn admin() -> HandlerError {
    StructuredError::forbidden().into()
}

// Unstructured failures leave the service as a generic internal error
async fn reports() -> Result<String, HandlerError> {
    let report = std::fs::read_to_string("/nonexistent/faultline/report.txt").context("failed to load report")?;
    Ok(report)
}

async fn teapot() -> Result<(), HandlerError> {
    let error = StructuredError::new(
        ErrorOptions::new()
            .status_code(418)
            .error_code("teapot")
            .error_message("The server refuses to brew coffee.")
            .error_details(details("beverage", Value::from("coffee"))),
    )?;

    Err(error.into())
}

fn details(key: &str, value: Value) -> ErrorDetails {
    let mut details = ErrorDetails::new();
    details.insert(key.to_owned(), value);
    details
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    async fn request(request: axum::http::Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn fetch(uri: &str) -> (StatusCode, Value) {
        request(axum::http::Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn submit(body: &'static str) -> (StatusCode, Value) {
        request(
            axum::http::Request::post("/widgets")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn known_widget() {
        let (status, body) = fetch("/widgets/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": 1, "name": "cog" }));
    }

    #[tokio::test]
    async fn unknown_widget() {
        let (status, body) = fetch("/widgets/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorCode"], "not_found");
    }

    #[tokio::test]
    async fn malformed_widget_id() {
        let (status, body) = fetch("/widgets/first").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "invalid_input");
        assert!(body["errorDetails"]["reason"].as_str().unwrap().contains("first"));
    }

    #[tokio::test]
    async fn blank_name_is_missing_input() {
        let (status, body) = submit(r#"{"name":"  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "errorCode": "missing_input",
                "errorMessage": "The request is missing a required input.",
                "errorDetails": { "name": "a non-empty string" }
            })
        );
    }

    #[tokio::test]
    async fn zero_quantity_is_invalid_input() {
        let (status, body) = submit(r#"{"name":"gear","quantity":0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "invalid_input");
    }

    #[tokio::test]
    async fn created_widget() {
        let (status, body) = submit(r#"{"name":"gear","quantity":2}"#).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "id": 3, "name": "gear" }));
    }

    #[tokio::test]
    async fn custom_error_keeps_its_status() {
        let (status, body) = fetch("/teapot").await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(
            body,
            json!({
                "errorCode": "teapot",
                "errorMessage": "The server refuses to brew coffee.",
                "errorDetails": { "beverage": "coffee" }
            })
        );
    }

    #[tokio::test]
    async fn io_failure_is_hidden() {
        let (status, body) = fetch("/reports").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "errorCode": "internal_error",
                "errorMessage": "An unknown server error occurred."
            })
        );
    }

    #[tokio::test]
    async fn legacy_is_gone() {
        let (status, body) = fetch("/legacy").await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["errorCode"], "gone");
    }
}

//! Routes that fail in every way the boundary has to handle

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use faultline_core::{ErrorOptions, StructuredError};
use faultline_server::{HandlerError, JsonBody, PathParams};
use serde_json::Value;

pub fn router() -> Router {
    Router::new()
        .route("/not-implemented", get(not_implemented))
        .route("/bananas", get(bananas))
        .route("/wrapped", get(wrapped))
        .route("/custom", get(custom))
        .route("/header", get(missing_header))
        .route("/echo", post(echo))
        .route("/items/{id}", get(item))
        .route("/panic", get(explode))
        .route("/ok", get(|| async { "fine" }))
}

async fn not_implemented() -> HandlerError {
    StructuredError::not_implemented().into()
}

async fn bananas() -> HandlerError {
    anyhow::anyhow!("bananas").into()
}

async fn wrapped() -> Result<(), HandlerError> {
    Err::<(), _>(StructuredError::unauthorized()).context("token lookup failed")?;
    Ok(())
}

async fn custom() -> Result<(), HandlerError> {
    let error = StructuredError::new(
        ErrorOptions::new()
            .status_code(409)
            .error_code("conflict")
            .error_message("The widget already exists."),
    )?;
    Err(error.into())
}

async fn missing_header() -> HandlerError {
    let mut details = faultline_core::ErrorDetails::new();
    details.insert("key".to_owned(), Value::from("x-api-key"));
    StructuredError::missing_header(Some(details)).into()
}

async fn echo(JsonBody(value): JsonBody<Value>) -> axum::Json<Value> {
    axum::Json(value)
}

async fn item(PathParams(id): PathParams<u64>) -> String {
    id.to_string()
}

async fn explode() -> &'static str {
    panic!("kaboom")
}

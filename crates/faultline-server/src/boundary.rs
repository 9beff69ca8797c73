use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use faultline_core::{ErrorOptions, RequestContext, ResponseSink, StructuredError};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use hyper::ext::ReasonPhrase;

/// Error type for axum handlers
///
/// Anything convertible into `anyhow::Error` (including [`StructuredError`])
/// can be returned with `?`. The response is finalized by
/// [`error_boundary_middleware`], which adds the request id and logs the
/// original error. Without the middleware the error is still rendered, just
/// without request context.
pub struct HandlerError(anyhow::Error);

impl HandlerError {
    /// Unwrap the underlying error
    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

impl<E> From<E> for HandlerError
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerError").field(&self.0).finish()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let mut sink = AxumSink::default();

        match self.0.downcast_ref::<StructuredError>() {
            Some(structured) => faultline_core::write_response(structured, None, &mut sink),
            None => faultline_core::write_response(&StructuredError::internal_error(), None, &mut sink),
        }

        let mut response = sink.into_response();
        response.extensions_mut().insert(PendingError::new(self.0));
        response
    }
}

/// Error parked in response extensions until the boundary picks it up
#[derive(Clone)]
struct PendingError(Arc<Mutex<Option<anyhow::Error>>>);

impl PendingError {
    fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(Mutex::new(Some(error))))
    }

    fn take(&self) -> Option<anyhow::Error> {
        self.0.lock().ok()?.take()
    }
}

/// [`ResponseSink`] that builds an axum response
///
/// The reason phrase travels as a [`ReasonPhrase`] extension, which hyper
/// writes on HTTP/1 status lines. Codes that are not valid reason phrases fall
/// back to the canonical phrase.
#[derive(Debug, Default)]
pub struct AxumSink {
    status: StatusCode,
    reason: Option<ReasonPhrase>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseSink for AxumSink {
    fn set_status(&mut self, status: StatusCode, reason: &str) {
        self.status = status;
        self.reason = match ReasonPhrase::try_from(reason.to_owned()) {
            Ok(phrase) => Some(phrase),
            Err(_) => {
                tracing::debug!(reason, "error code is not a valid reason phrase");
                None
            }
        };
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }
}

impl IntoResponse for AxumSink {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;

        if let Some(reason) = self.reason {
            response.extensions_mut().insert(reason);
        }

        response
    }
}

/// Render a failure with the given request context
pub fn emit(error: impl Into<anyhow::Error>, context: &RequestContext) -> Response {
    let mut sink = AxumSink::default();
    faultline_core::handle(error, context, &mut sink);
    sink.into_response()
}

/// Middleware that finalizes every [`HandlerError`] response
///
/// Runs the inner service, and if it produced a handler error, replaces the
/// provisional response with one rendered against the request's
/// [`RequestContext`]. Successful responses pass through untouched.
pub async fn error_boundary_middleware(request: Request, next: Next) -> Response {
    let context = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    let mut response = next.run(request).await;

    let Some(pending) = response.extensions_mut().remove::<PendingError>() else {
        return response;
    };

    match pending.take() {
        Some(error) => emit(error, &context),
        None => response,
    }
}

/// Fallback for routes that do not exist
pub async fn not_found_fallback() -> HandlerError {
    StructuredError::not_found().into()
}

/// Fallback for known routes hit with an unsupported method
pub async fn method_not_allowed_fallback() -> HandlerError {
    let options = ErrorOptions::new()
        .status_code(StatusCode::METHOD_NOT_ALLOWED.as_u16())
        .error_code("method_not_allowed")
        .error_message("The request method is not supported by the requested resource.");

    match StructuredError::new(options) {
        Ok(error) => error.into(),
        Err(e) => e.into(),
    }
}

/// Turn a handler panic into a handler error so the boundary can render it
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());

    HandlerError::from(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

use http::StatusCode;
use http::header::{self, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::context::{LogPayload, RequestContext};
use crate::error::{ErrorDetails, StructuredError};

/// Message logged alongside every error sent to a client
pub const LOG_MESSAGE: &str = "faultline: an error was sent to the client";

/// Content type of every error response
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Only used if the body cannot be encoded, which serde_json never does for string-keyed maps
const FALLBACK_BODY: &[u8] = br#"{"errorCode":"internal_error","errorMessage":"An unknown server error occurred."}"#;

/// Write side of a single HTTP response
///
/// The boundary calls each method exactly once per handled error. A sink
/// that cannot write is not recoverable at this layer and may panic.
pub trait ResponseSink {
    /// Set the status code and reason phrase
    fn set_status(&mut self, status: StatusCode, reason: &str);

    /// Set a response header
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Write the complete body
    fn write_body(&mut self, body: Vec<u8>);
}

/// JSON body of an error response
///
/// Absent fields are omitted, never `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: String,
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

impl ErrorBody {
    /// Build the client-facing view of an error
    pub fn new(error: &StructuredError, request_id: Option<&str>) -> Self {
        Self {
            error_code: error.error_code().to_owned(),
            error_message: error.error_message().to_owned(),
            request_id: request_id.map(ToOwned::to_owned),
            error_details: error.error_details().cloned(),
        }
    }
}

/// Turn any failure into exactly one JSON error response
///
/// Logs the original error through the context's logger (when present)
/// before anything is written, normalizes it, then writes the status line,
/// `content-type` header and body to `sink`. This is a terminal operation:
/// nothing is forwarded to another handler.
pub fn handle<S>(error: impl Into<anyhow::Error>, context: &RequestContext, sink: &mut S)
where
    S: ResponseSink + ?Sized,
{
    let error = error.into();

    if let Some(logger) = &context.logger {
        logger.warn(LogPayload { err: &error }, LOG_MESSAGE);
    }

    let error = StructuredError::normalize(error);
    write_response(&error, context.request_id(), sink);
}

/// Write an already structured error to `sink`
///
/// This is the final step of [`handle`], without logging or normalization.
pub fn write_response<S>(error: &StructuredError, request_id: Option<&str>, sink: &mut S)
where
    S: ResponseSink + ?Sized,
{
    let body = ErrorBody::new(error, request_id);

    let bytes = serde_json::to_vec(&body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode error body");
        FALLBACK_BODY.to_vec()
    });

    sink.set_status(error.status_code(), error.error_code());
    sink.set_header(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    sink.write_body(bytes);
}

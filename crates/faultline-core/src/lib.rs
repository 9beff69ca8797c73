//! Structured HTTP errors and the boundary that turns any failure into a JSON response
//!
//! Domain code raises [`StructuredError`]s (usually through the catalog
//! factories such as [`StructuredError::not_found`]) or any other error. The
//! hosting transport hands whatever failed to [`handle`], which normalizes it
//! and writes a single response through a [`ResponseSink`].

#![allow(clippy::must_use_candidate)]

mod catalog;
mod context;
mod emitter;
mod error;

pub use catalog::Category;
pub use context::{LogPayload, RequestContext, RequestLogger, TracingLogger};
pub use emitter::{CONTENT_TYPE_JSON, ErrorBody, LOG_MESSAGE, ResponseSink, handle, write_response};
pub use error::{ConstructionError, ErrorDetails, ErrorOptions, StructuredError};

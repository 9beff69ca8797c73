use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use faultline_core::{RequestContext, RequestLogger, TracingLogger};
use http::HeaderName;

/// Where the request context middleware finds its inputs
#[derive(Clone)]
pub struct ContextSettings {
    /// Header carrying the correlation id
    pub request_id_header: HeaderName,
    /// Logger attached to every request, if error logging is enabled
    pub logger: Option<Arc<dyn RequestLogger>>,
}

impl ContextSettings {
    /// Settings derived from the `[errors]` configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the configured header is not a valid header name
    pub fn from_config(config: &faultline_config::ErrorsConfig) -> anyhow::Result<Self> {
        let request_id_header = HeaderName::try_from(config.request_id_header.as_str())
            .map_err(|e| anyhow::anyhow!("invalid request id header '{}': {e}", config.request_id_header))?;

        let logger: Option<Arc<dyn RequestLogger>> = if config.log_errors {
            Some(Arc::new(TracingLogger))
        } else {
            None
        };

        Ok(Self {
            request_id_header,
            logger,
        })
    }

    fn context_for(&self, request: &Request) -> RequestContext {
        let request_id = request
            .headers()
            .get(&self.request_id_header)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);

        RequestContext {
            request_id,
            logger: self.logger.clone(),
        }
    }
}

/// Middleware that attaches a [`RequestContext`] to the request
///
/// The context is stored in request extensions, where the error boundary
/// and handlers (via `Extension<RequestContext>`) can read it.
pub async fn request_context_middleware(settings: ContextSettings, request: Request, next: Next) -> Response {
    let context = settings.context_for(&request);

    let mut request = request;
    request.extensions_mut().insert(context);

    next.run(request).await
}

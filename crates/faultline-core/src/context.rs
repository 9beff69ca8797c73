use std::fmt;
use std::sync::Arc;

/// Diagnostic payload passed to a [`RequestLogger`]
///
/// The original, pre-normalization error always sits under `err`.
#[derive(Debug, Clone, Copy)]
pub struct LogPayload<'a> {
    pub err: &'a anyhow::Error,
}

/// Logging capability attached to a request
///
/// Implementations must not swallow their own failures: a logger that cannot
/// log is a deployment defect and is allowed to panic.
pub trait RequestLogger: Send + Sync {
    /// Record an error that is about to be sent to the client
    fn warn(&self, payload: LogPayload<'_>, message: &str);
}

/// [`RequestLogger`] backed by `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn warn(&self, payload: LogPayload<'_>, message: &str) {
        let err = format!("{:#}", payload.err);
        tracing::warn!(%err, "{message}");
    }
}

/// Ambient request state consumed by the error boundary
///
/// Carries an optional correlation id and an optional logger. Both are
/// supplied by the hosting transport; nothing here generates ids.
#[derive(Clone, Default)]
pub struct RequestContext {
    /// Correlation id echoed back in error bodies
    pub request_id: Option<String>,
    /// Logger that receives every handled error
    pub logger: Option<Arc<dyn RequestLogger>>,
}

impl RequestContext {
    /// Context with neither a request id nor a logger
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a correlation id
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach a logger
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Correlation id, ignoring empty values
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref().filter(|id| !id.is_empty())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("logger", &self.logger.as_ref().map(|_| "..."))
            .finish()
    }
}

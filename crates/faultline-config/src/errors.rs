use serde::Deserialize;

/// How failed requests are turned into error responses
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorsConfig {
    /// Header carrying the request correlation id, echoed as `requestId`
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
    /// Generate a request id when the client did not send one
    #[serde(default)]
    pub generate_request_id: bool,
    /// Log every error sent to a client at `warn` level
    #[serde(default = "default_log_errors")]
    pub log_errors: bool,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            request_id_header: default_request_id_header(),
            generate_request_id: false,
            log_errors: default_log_errors(),
        }
    }
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_log_errors() -> bool {
    true
}

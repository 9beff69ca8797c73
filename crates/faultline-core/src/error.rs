use std::fmt;

use http::StatusCode;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};

use crate::catalog::Category;

/// Extra machine-readable context attached to an error (e.g. the offending header)
pub type ErrorDetails = Map<String, Value>;

/// Errors raised when building a [`StructuredError`] from [`ErrorOptions`]
///
/// These indicate a programming mistake in the caller and are never sent to
/// API consumers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// A required property was absent, zero or empty
    #[error("{0} is a required property")]
    MissingProperty(&'static str),

    /// Status code cannot be carried by an HTTP status line
    #[error("statusCode {0} is not a valid HTTP status")]
    InvalidStatusCode(u16),
}

/// Input for [`StructuredError::new`]
///
/// Every field is optional here so that missing required properties surface
/// as a [`ConstructionError`] instead of a type error.
#[derive(Debug, Default)]
pub struct ErrorOptions {
    /// HTTP status to report
    pub status_code: Option<u16>,
    /// Machine-readable category, also used as the status text
    pub error_code: Option<String>,
    /// Human-readable summary
    pub error_message: Option<String>,
    /// Extra machine-readable context
    pub error_details: Option<ErrorDetails>,
    /// Causing error, kept for diagnostics only
    pub original_error: Option<anyhow::Error>,
}

impl ErrorOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP status
    #[must_use]
    pub fn status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Set the machine-readable error code
    #[must_use]
    pub fn error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Set the human-readable message
    #[must_use]
    pub fn error_message(mut self, error_message: impl Into<String>) -> Self {
        self.error_message = Some(error_message.into());
        self
    }

    /// Attach details
    #[must_use]
    pub fn error_details(mut self, error_details: ErrorDetails) -> Self {
        self.error_details = Some(error_details);
        self
    }

    /// Attach the causing error
    #[must_use]
    pub fn original_error(mut self, original_error: impl Into<anyhow::Error>) -> Self {
        self.original_error = Some(original_error.into());
        self
    }
}

/// An error with an intentional HTTP status, code and message
///
/// Instances are immutable: fields are only readable through accessors. The
/// original error, when present, is exposed as [`std::error::Error::source`]
/// and is never serialized.
#[derive(Debug)]
pub struct StructuredError {
    status_code: StatusCode,
    error_code: String,
    error_message: String,
    error_details: Option<ErrorDetails>,
    original_error: Option<anyhow::Error>,
}

impl StructuredError {
    /// Discriminator carried by every instance
    pub const NAME: &'static str = "HTTPError";

    /// Build a validated error
    ///
    /// Required properties are checked in the order `statusCode`, `errorCode`,
    /// `errorMessage`. A status of `0` or an empty string counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingProperty`] naming the first missing
    /// property, or [`ConstructionError::InvalidStatusCode`] when the status is
    /// outside `100..=999`
    pub fn new(options: ErrorOptions) -> Result<Self, ConstructionError> {
        let ErrorOptions {
            status_code,
            error_code,
            error_message,
            error_details,
            original_error,
        } = options;

        let status_code = status_code
            .filter(|code| *code != 0)
            .ok_or(ConstructionError::MissingProperty("statusCode"))?;
        let error_code = non_empty(error_code).ok_or(ConstructionError::MissingProperty("errorCode"))?;
        let error_message = non_empty(error_message).ok_or(ConstructionError::MissingProperty("errorMessage"))?;

        let status_code =
            StatusCode::from_u16(status_code).map_err(|_| ConstructionError::InvalidStatusCode(status_code))?;

        Ok(Self {
            status_code,
            error_code,
            error_message,
            error_details,
            original_error,
        })
    }

    /// Convert any failure into a structured error
    ///
    /// A `StructuredError` (also one wrapped in `anyhow` context) comes back
    /// unchanged. Anything else becomes a generic 500 `internal_error` that
    /// keeps the input as its original error.
    pub fn normalize(input: impl Into<anyhow::Error>) -> Self {
        match input.into().downcast::<Self>() {
            Ok(structured) => structured,
            Err(original) => Self::from_category(Category::InternalError, None, Some(original)),
        }
    }

    pub(crate) fn from_category(
        category: Category,
        error_details: Option<ErrorDetails>,
        original_error: Option<anyhow::Error>,
    ) -> Self {
        Self {
            status_code: category.status_code(),
            error_code: category.code().to_owned(),
            error_message: category.message().to_owned(),
            error_details,
            original_error,
        }
    }

    /// Fixed discriminator, always [`Self::NAME`]
    pub const fn name(&self) -> &'static str {
        Self::NAME
    }

    /// HTTP status to report
    pub const fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// Human-readable message
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Extra context, if any
    pub const fn error_details(&self) -> Option<&ErrorDetails> {
        self.error_details.as_ref()
    }

    /// Causing error, if any
    pub const fn original_error(&self) -> Option<&anyhow::Error> {
        self.original_error.as_ref()
    }

    /// Catalog entry this error matches, if it was built from one
    pub fn category(&self) -> Option<Category> {
        Category::from_code(&self.error_code).filter(|category| category.status_code() == self.status_code)
    }
}

impl From<anyhow::Error> for StructuredError {
    fn from(error: anyhow::Error) -> Self {
        Self::normalize(error)
    }
}

impl TryFrom<ErrorOptions> for StructuredError {
    type Error = ConstructionError;

    fn try_from(options: ErrorOptions) -> Result<Self, Self::Error> {
        Self::new(options)
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_message)
    }
}

impl std::error::Error for StructuredError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.original_error.as_ref().map(|error| {
            let source: &(dyn std::error::Error + 'static) = &**error;
            source
        })
    }
}

// The original error is never serialized
impl Serialize for StructuredError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.error_details.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("StructuredError", len)?;

        state.serialize_field("name", Self::NAME)?;
        state.serialize_field("statusCode", &self.status_code.as_u16())?;
        state.serialize_field("errorCode", &self.error_code)?;
        state.serialize_field("errorMessage", &self.error_message)?;

        match &self.error_details {
            Some(details) => state.serialize_field("errorDetails", details)?,
            None => state.skip_field("errorDetails")?,
        }

        state.end()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

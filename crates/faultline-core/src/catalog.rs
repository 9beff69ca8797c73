use http::StatusCode;
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::error::{ErrorDetails, StructuredError};

/// Standard HTTP failure categories
///
/// Each category fixes the status, code and message of the errors built
/// from it. The code is the snake-case variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Gone,
    InternalError,
    NotImplemented,
    MissingHeader,
    InvalidHeader,
    MissingBody,
    MissingInput,
    InvalidInput,
    InvalidJson,
}

impl Category {
    /// Look up a category by its error code
    pub fn from_code(code: &str) -> Option<Self> {
        code.parse().ok()
    }

    /// Machine-readable error code (e.g. `missing_header`)
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// HTTP status reported for this category
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest
            | Self::MissingHeader
            | Self::InvalidHeader
            | Self::MissingBody
            | Self::MissingInput
            | Self::InvalidInput
            | Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Gone => StatusCode::GONE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Fixed human-readable message
    pub const fn message(self) -> &'static str {
        match self {
            Self::BadRequest => "The server cannot process the request.",
            Self::Unauthorized => "The request requires user authentication.",
            Self::Forbidden => "The server understood the request, but is refusing to fulfill it.",
            Self::NotFound => "The requested resource does not exist.",
            Self::Gone => "The requested resource is no longer available.",
            Self::InternalError => "An unknown server error occurred.",
            Self::NotImplemented => "The requested resource has not been implemented.",
            Self::MissingHeader => "The request is missing a required header.",
            Self::InvalidHeader => "The request specified an invalid header.",
            Self::MissingBody => "The request body is empty.",
            Self::MissingInput => "The request is missing a required input.",
            Self::InvalidInput => "The request specified an invalid input.",
            Self::InvalidJson => "The request body does not contain valid JSON.",
        }
    }

    /// Whether the factory for this category takes error details
    pub const fn accepts_details(self) -> bool {
        matches!(
            self,
            Self::MissingHeader | Self::InvalidHeader | Self::MissingInput | Self::InvalidInput
        )
    }
}

impl From<Category> for StructuredError {
    fn from(category: Category) -> Self {
        Self::from_category(category, None, None)
    }
}

impl StructuredError {
    /// 400 `bad_request`
    pub fn bad_request() -> Self {
        Category::BadRequest.into()
    }

    /// 401 `unauthorized`
    pub fn unauthorized() -> Self {
        Category::Unauthorized.into()
    }

    /// 403 `forbidden`
    pub fn forbidden() -> Self {
        Category::Forbidden.into()
    }

    /// 404 `not_found`
    pub fn not_found() -> Self {
        Category::NotFound.into()
    }

    /// 410 `gone`
    pub fn gone() -> Self {
        Category::Gone.into()
    }

    /// 500 `internal_error`
    pub fn internal_error() -> Self {
        Category::InternalError.into()
    }

    /// 501 `not_implemented`
    pub fn not_implemented() -> Self {
        Category::NotImplemented.into()
    }

    /// 400 `missing_header`, e.g. with `{"key": "content-type"}`
    pub fn missing_header(details: Option<ErrorDetails>) -> Self {
        Self::from_category(Category::MissingHeader, details, None)
    }

    /// 400 `invalid_header`
    pub fn invalid_header(details: Option<ErrorDetails>) -> Self {
        Self::from_category(Category::InvalidHeader, details, None)
    }

    /// 400 `missing_body`
    pub fn missing_body() -> Self {
        Category::MissingBody.into()
    }

    /// 400 `missing_input`
    pub fn missing_input(details: Option<ErrorDetails>) -> Self {
        Self::from_category(Category::MissingInput, details, None)
    }

    /// 400 `invalid_input`
    pub fn invalid_input(details: Option<ErrorDetails>) -> Self {
        Self::from_category(Category::InvalidInput, details, None)
    }

    /// 400 `invalid_json`
    pub fn invalid_json() -> Self {
        Category::InvalidJson.into()
    }
}

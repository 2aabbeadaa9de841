use async_graphql::{parser::types::OperationType, ServerError};
use lambda_http::http::StatusCode;
use thiserror::Error;

/// Unified failure for every way a request can fall out of the pipeline
/// before a well-formed execution result exists.
///
/// Each variant carries the HTTP status the HTTP binding reports and,
/// where the failure originated inside the GraphQL engine, the underlying
/// engine errors. The direct-event binding ignores the status and reports
/// only the error list.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The transport method was neither GET nor POST.
    #[error("GraphQL only supports GET and POST requests.")]
    MethodNotAllowed,

    /// No query string could be extracted from the request.
    #[error("Must provide query string.")]
    MissingQuery,

    /// A POST body claimed to be JSON but did not parse.
    #[error("POST body sent invalid JSON.")]
    InvalidBodyJson(#[source] serde_json::Error),

    /// The `variables` value was a string that did not parse as JSON.
    #[error("Variables are invalid JSON.")]
    InvalidVariablesJson(#[source] serde_json::Error),

    /// The query string failed to parse.
    #[error("GraphQL syntax error.")]
    Syntax(ServerError),

    /// Caller-supplied validation rules rejected the document.
    #[error("GraphQL validation failed.")]
    Validation(Vec<ServerError>),

    /// A non-query operation arrived over a read-only transport (GET).
    #[error("Can only perform a {0} operation from a POST request.")]
    OperationDisallowed(OperationType),

    /// Misconfiguration, e.g. a failing options factory.
    #[error("{0}")]
    Internal(String),
}

impl RequestError {
    /// Status code the HTTP binding responds with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed | Self::OperationDisallowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// `Allow` header value for 405 responses.
    #[must_use]
    pub fn allow(&self) -> Option<&'static str> {
        match self {
            Self::MethodNotAllowed => Some("GET, POST"),
            Self::OperationDisallowed(_) => Some("POST"),
            _ => None,
        }
    }

    /// The engine-level errors to report in the response body.
    ///
    /// Variants that wrap engine errors yield them as-is; the rest
    /// synthesize a single error from the failure message.
    #[must_use]
    pub fn into_graphql_errors(self) -> Vec<ServerError> {
        match self {
            Self::Syntax(err) => vec![err],
            Self::Validation(errs) => errs,
            other => vec![ServerError::new(other.to_string(), None)],
        }
    }
}

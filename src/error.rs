use hyper::{Method, StatusCode};
use thiserror::Error;

/// An opaque error raised by a route handler or a middleware.
///
/// Handlers may fail with any error type; it is boxed into `RouteError` and carried by
/// [`Error::Handler`](./enum.Error.html#variant.Handler) until the error middleware maps it
/// to a response.
pub type RouteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type shared by the router, its middleware and the route handlers.
///
/// `NotFound`, `Unauthorized`, `Validation`, `Internal` and `Handler` are the request-level
/// failures which the [error middleware](./fn.error_handler.html) translates into HTTP
/// responses. `PayloadTooLarge` is answered by the service layer before routing.
/// `InvalidRoute` and `Config` surface setup failures.
#[derive(Debug, Error)]
pub enum Error {
    /// No registered route matches the path, or the matched route has no handler for the method.
    #[error("Not Found: {method} {path}")]
    NotFound { method: Method, path: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request data: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// An error raised by handler code, opaque to the router.
    #[error(transparent)]
    Handler(RouteError),

    /// The request body exceeded the configured limit before it reached the router.
    #[error("Payload too large: the body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// A route template could not be compiled.
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found<P: Into<String>>(method: Method, path: P) -> Error {
        Error::NotFound {
            method,
            path: path.into(),
        }
    }

    pub fn unauthorized<M: Into<String>>(msg: M) -> Error {
        Error::Unauthorized(msg.into())
    }

    pub fn validation<M: Into<String>>(msg: M) -> Error {
        Error::Validation(msg.into())
    }

    pub fn internal<M: Into<String>>(msg: M) -> Error {
        Error::Internal(msg.into())
    }

    /// Wraps an arbitrary handler error.
    pub fn handler<E: Into<RouteError>>(err: E) -> Error {
        Error::Handler(err.into())
    }

    /// The HTTP status this error maps to when it reaches the error middleware.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients in production mode.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "Resource not found",
            Error::Unauthorized(_) => "Unauthorized access",
            Error::Validation(_) => "Invalid request data",
            Error::PayloadTooLarge { .. } => "Payload too large",
            _ => "Internal server error",
        }
    }

    /// Returns `true` for the not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::internal(format!("Couldn't build the http response: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Handler(Box::new(err))
    }
}

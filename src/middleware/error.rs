use super::{Middleware, Next};
use crate::env::Env;
use crate::Error;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response};
use tracing::{debug, error, warn, Level};

/// Creates the catch-all error middleware.
///
/// It must be registered first so that it wraps every other middleware and the route
/// handler. Any [`Error`](../enum.Error.html) returned further down the chain, including
/// the not-found error for unmatched requests, is logged and turned into a `text/plain`
/// response with the mapped status code. Outside production the body carries the error
/// details; in production it carries a fixed public message. Only 5xx errors are logged at
/// `error` level. Other client errors go to `warn` and unmatched paths to `debug`.
///
/// The router doesn't check that this middleware is present. Without it, errors surface
/// from [`Router::handle`](../struct.Router.html#method.handle) to the service layer,
/// which answers with a bare 500.
pub fn error_handler() -> Middleware {
    Middleware::new(handle_errors)
}

async fn handle_errors(req: Request<Full<Bytes>>, env: Env, next: Next) -> crate::Result<Response<Full<Bytes>>> {
    let method = req.method().clone();
    let uri = req.uri().clone();

    match next.run(req).await {
        Ok(res) => Ok(res),
        Err(err) => {
            let level = log_level(&err);
            if level == Level::ERROR {
                error!(error = %err, detail = ?err, method = %method, url = %uri, "application error");
            } else if level == Level::WARN {
                warn!(error = %err, method = %method, url = %uri, "request rejected");
            } else {
                debug!(method = %method, url = %uri, "no route matched");
            }
            error_response(&err, &env)
        }
    }
}

fn log_level(err: &Error) -> Level {
    if err.status_code().is_server_error() {
        Level::ERROR
    } else if err.is_not_found() {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

pub(crate) fn error_response(err: &Error, env: &Env) -> crate::Result<Response<Full<Bytes>>> {
    let body = if env.environment().is_production() {
        err.public_message().to_owned()
    } else {
        format!("Error: {}\n\nDetail: {:?}", err, err)
    };

    let res = Response::builder()
        .status(err.status_code())
        .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
        .body(Full::new(Bytes::from(body)))?;

    Ok(res)
}

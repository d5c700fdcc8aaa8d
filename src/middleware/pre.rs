use crate::env::Env;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Request;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type Handler = Arc<dyn Fn(Request<Full<Bytes>>, Env) -> HandlerReturn + Send + Sync + 'static>;
type HandlerReturn = BoxFuture<'static, crate::Result<Request<Full<Bytes>>>>;

/// The pre middleware type: it transforms the request before the rest of the chain runs.
///
/// Returning an error stops the chain; the error travels back out through the outer middleware.
#[derive(Clone)]
pub struct PreMiddleware {
    pub(crate) handler: Handler,
}

impl PreMiddleware {
    /// Creates a pre middleware.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::{Env, Middleware, PreMiddleware, Router};
    ///
    /// let router = Router::builder()
    ///     .middleware(Middleware::Pre(PreMiddleware::new(|req, _env: Env| async move {
    ///         /* Do some operations */
    ///         Ok(req)
    ///     })))
    ///     .build()
    ///     .unwrap();
    /// # let _ = router;
    /// ```
    pub fn new<H, R>(handler: H) -> PreMiddleware
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Request<Full<Bytes>>>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |req: Request<Full<Bytes>>, env: Env| -> HandlerReturn { Box::pin(handler(req, env)) });
        PreMiddleware { handler }
    }

    pub(crate) async fn process(&self, req: Request<Full<Bytes>>, env: Env) -> crate::Result<Request<Full<Bytes>>> {
        (self.handler)(req, env).await
    }
}

impl Debug for PreMiddleware {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PreMiddleware")
    }
}

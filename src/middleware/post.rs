use crate::env::Env;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type Handler = Arc<dyn Fn(Response<Full<Bytes>>, Env) -> HandlerReturn + Send + Sync + 'static>;
type HandlerReturn = BoxFuture<'static, crate::Result<Response<Full<Bytes>>>>;

/// The post middleware type: it transforms the response produced by the rest of the chain.
///
/// It is skipped when the inner chain fails, so the error reaches the outer middleware unchanged.
#[derive(Clone)]
pub struct PostMiddleware {
    pub(crate) handler: Handler,
}

impl PostMiddleware {
    /// Creates a post middleware.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::{Env, Middleware, PostMiddleware, Router};
    /// use hyper::header::HeaderValue;
    ///
    /// let router = Router::builder()
    ///     .middleware(Middleware::Post(PostMiddleware::new(|mut res, _env: Env| async move {
    ///         res.headers_mut().insert("x-powered-by", HeaderValue::from_static("deadlight"));
    ///         Ok(res)
    ///     })))
    ///     .build()
    ///     .unwrap();
    /// # let _ = router;
    /// ```
    pub fn new<H, R>(handler: H) -> PostMiddleware
    where
        H: Fn(Response<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |res: Response<Full<Bytes>>, env: Env| -> HandlerReturn { Box::pin(handler(res, env)) });
        PostMiddleware { handler }
    }

    pub(crate) async fn process(&self, res: Response<Full<Bytes>>, env: Env) -> crate::Result<Response<Full<Bytes>>> {
        (self.handler)(res, env).await
    }
}

impl Debug for PostMiddleware {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PostMiddleware")
    }
}

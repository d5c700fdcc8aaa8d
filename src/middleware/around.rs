use super::Next;
use crate::env::Env;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type Handler = Arc<dyn Fn(Request<Full<Bytes>>, Env, Next) -> HandlerReturn + Send + Sync + 'static>;
type HandlerReturn = BoxFuture<'static, crate::Result<Response<Full<Bytes>>>>;

/// The around middleware type: it receives the request, the environment and the
/// continuation of the chain.
///
/// It decides whether and when the rest of the chain runs. It may call `next.run(req)`
/// once and inspect or replace the result, catch the error it returns, or drop `next` and
/// answer on its own.
#[derive(Clone)]
pub struct AroundMiddleware {
    pub(crate) handler: Handler,
}

impl AroundMiddleware {
    pub fn new<H, R>(handler: H) -> AroundMiddleware
    where
        H: Fn(Request<Full<Bytes>>, Env, Next) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |req: Request<Full<Bytes>>, env: Env, next: Next| -> HandlerReturn {
            Box::pin(handler(req, env, next))
        });
        AroundMiddleware { handler }
    }

    pub(crate) fn process(&self, req: Request<Full<Bytes>>, env: Env, next: Next) -> HandlerReturn {
        (self.handler)(req, env, next)
    }
}

impl Debug for AroundMiddleware {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AroundMiddleware")
    }
}

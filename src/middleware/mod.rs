use crate::env::Env;
use crate::route::Handler;
use futures::future::{BoxFuture, FutureExt};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

pub use self::around::AroundMiddleware;
pub use self::auth::{admin_only, create_session, current_user, protected, require_session, CurrentUser, Session};
pub use self::error::error_handler;
pub use self::logging::request_logger;
pub use self::post::PostMiddleware;
pub use self::pre::PreMiddleware;

mod around;
mod auth;
mod error;
mod logging;
mod post;
mod pre;

/// Enum type for all the middleware types. Please refer to the [Middleware](./index.html#middleware) for more info.
///
/// Middleware run in registration order: the first registered is the outermost, sees the
/// raw request first and the final response last. The route handler is innermost.
#[derive(Debug, Clone)]
pub enum Middleware {
    /// Variant for the around middleware, which controls the call to the rest of the chain.
    Around(AroundMiddleware),

    /// Variant for the pre middleware, which transforms the request.
    Pre(PreMiddleware),

    /// Variant for the post middleware, which transforms the response.
    Post(PostMiddleware),
}

impl Middleware {
    /// Creates an around middleware.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::{Env, Middleware, Next, Router};
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Request, Response};
    ///
    /// async fn maintenance(req: Request<Full<Bytes>>, env: Env, next: Next) -> deadlight_router::Result<Response<Full<Bytes>>> {
    ///     if env.secret("maintenance").is_some() {
    ///         // Short-circuit: the handler never runs.
    ///         return Ok(Response::new(Full::new(Bytes::from("Down for maintenance"))));
    ///     }
    ///     next.run(req).await
    /// }
    ///
    /// let router = Router::builder()
    ///     .middleware(Middleware::new(maintenance))
    ///     .build()
    ///     .unwrap();
    /// # let _ = router;
    /// ```
    pub fn new<H, R>(handler: H) -> Middleware
    where
        H: Fn(Request<Full<Bytes>>, Env, Next) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        Middleware::Around(AroundMiddleware::new(handler))
    }

    /// Creates a pre middleware.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::{Env, Middleware, Router};
    ///
    /// let router = Router::builder()
    ///     .middleware(Middleware::pre(|req, _env: Env| async move {
    ///         /* Do some operations */
    ///         Ok(req)
    ///     }))
    ///     .build()
    ///     .unwrap();
    /// # let _ = router;
    /// ```
    pub fn pre<H, R>(handler: H) -> Middleware
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Request<Full<Bytes>>>> + Send + 'static,
    {
        Middleware::Pre(PreMiddleware::new(handler))
    }

    /// Creates a post middleware.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::{Env, Middleware, Router};
    ///
    /// let router = Router::builder()
    ///     .middleware(Middleware::post(|res, _env: Env| async move {
    ///         /* Do some operations */
    ///         Ok(res)
    ///     }))
    ///     .build()
    ///     .unwrap();
    /// # let _ = router;
    /// ```
    pub fn post<H, R>(handler: H) -> Middleware
    where
        H: Fn(Response<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        Middleware::Post(PostMiddleware::new(handler))
    }

    fn process(&self, req: Request<Full<Bytes>>, env: Env, next: Next) -> BoxFuture<'static, crate::Result<Response<Full<Bytes>>>> {
        match self {
            Middleware::Around(m) => m.process(req, env, next),
            Middleware::Pre(m) => {
                let m = m.clone();
                async move {
                    let req = m.process(req, env).await?;
                    next.run(req).await
                }
                .boxed()
            }
            Middleware::Post(m) => {
                let m = m.clone();
                async move {
                    let res = next.run(req).await?;
                    m.process(res, env).await
                }
                .boxed()
            }
        }
    }
}

/// The remainder of the middleware chain, handed to an around middleware.
///
/// Calling [`run`](#method.run) invokes the next middleware, or the route handler once
/// every middleware has been entered. `run` consumes `Next`, so the rest of the chain
/// runs at most once; dropping `Next` without running it short-circuits the handler.
pub struct Next {
    middlewares: Arc<Vec<Middleware>>,
    index: usize,
    handler: Handler,
    env: Env,
}

impl Next {
    /// Runs the rest of the chain with `req`.
    pub fn run(self, req: Request<Full<Bytes>>) -> BoxFuture<'static, crate::Result<Response<Full<Bytes>>>> {
        let Next {
            middlewares,
            index,
            handler,
            env,
        } = self;

        match middlewares.get(index).cloned() {
            Some(middleware) => {
                let next = Next {
                    middlewares,
                    index: index + 1,
                    handler,
                    env: env.clone(),
                };
                middleware.process(req, env, next)
            }
            None => handler(req, env),
        }
    }

    /// How many middleware are still to be entered before the handler.
    pub fn remaining(&self) -> usize {
        self.middlewares.len().saturating_sub(self.index)
    }
}

impl Debug for Next {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ Next: index: {}, remaining: {} }}", self.index, self.remaining())
    }
}

/// An ordered, append-only list of middleware.
///
/// It is filled while the router is being configured and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub(crate) struct Chain {
    middlewares: Arc<Vec<Middleware>>,
}

impl Chain {
    pub(crate) fn new() -> Chain {
        Chain::default()
    }

    pub(crate) fn push(&mut self, middleware: Middleware) {
        Arc::make_mut(&mut self.middlewares).push(middleware);
    }

    pub(crate) fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Composes the chain around `handler`: running the returned `Next` enters the first
    /// middleware, which wraps the second, and so on down to the handler.
    pub(crate) fn build(&self, handler: Handler, env: Env) -> Next {
        Next {
            middlewares: self.middlewares.clone(),
            index: 0,
            handler,
            env,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::boxed_handler;
    use crate::Error;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn recorder(trace: &Trace, name: &'static str) -> Middleware {
        let trace = trace.clone();
        Middleware::new(move |req, _env, next: Next| {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push(format!("{}-entry", name));
                let res = next.run(req).await;
                trace.lock().unwrap().push(format!("{}-exit", name));
                res
            }
        })
    }

    fn recording_handler(trace: &Trace) -> Handler {
        let trace = trace.clone();
        boxed_handler(move |_, _| {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push("H-entry".to_owned());
                let res = Response::new(Full::new(Bytes::from("handler")));
                trace.lock().unwrap().push("H-exit".to_owned());
                Ok(res)
            }
        })
    }

    async fn body_text(res: Response<Full<Bytes>>) -> String {
        let body = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn request() -> Request<Full<Bytes>> {
        Request::new(Full::new(Bytes::new()))
    }

    #[tokio::test]
    async fn should_nest_in_registration_order() {
        let trace: Trace = Arc::default();
        let mut chain = Chain::new();
        chain.push(recorder(&trace, "M1"));
        chain.push(recorder(&trace, "M2"));

        let next = chain.build(recording_handler(&trace), Env::default());
        assert_eq!(next.remaining(), 2);

        let res = next.run(request()).await.unwrap();
        assert_eq!(body_text(res).await, "handler");
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["M1-entry", "M2-entry", "H-entry", "H-exit", "M2-exit", "M1-exit"]
        );
    }

    #[tokio::test]
    async fn should_short_circuit_when_next_is_not_run() {
        let called = Arc::new(AtomicBool::new(false));
        let seen = called.clone();

        let mut chain = Chain::new();
        chain.push(Middleware::new(|_req, _env, _next: Next| async move {
            Ok(Response::new(Full::new(Bytes::from("blocked"))))
        }));

        let handler = boxed_handler(move |_, _| {
            let seen = seen.clone();
            async move {
                seen.store(true, Ordering::SeqCst);
                Ok(Response::new(Full::new(Bytes::new())))
            }
        });

        let res = chain.build(handler, Env::default()).run(request()).await.unwrap();
        assert_eq!(body_text(res).await, "blocked");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn should_let_middleware_catch_errors() {
        let mut chain = Chain::new();
        chain.push(Middleware::new(|req, _env, next: Next| async move {
            match next.run(req).await {
                Ok(res) => Ok(res),
                Err(err) => Ok(Response::new(Full::new(Bytes::from(format!("caught: {}", err))))),
            }
        }));

        let handler = boxed_handler(|_, _| async { Err(Error::validation("missing title")) });

        let res = chain.build(handler, Env::default()).run(request()).await.unwrap();
        assert_eq!(body_text(res).await, "caught: Invalid request data: missing title");
    }

    #[tokio::test]
    async fn should_run_pre_and_post_middleware() {
        let mut chain = Chain::new();
        chain.push(Middleware::post(|mut res: Response<Full<Bytes>>, _env| async move {
            res.headers_mut().insert("x-post", "1".parse().unwrap());
            Ok(res)
        }));
        chain.push(Middleware::pre(|mut req: Request<Full<Bytes>>, _env| async move {
            req.headers_mut().insert("x-pre", "1".parse().unwrap());
            Ok(req)
        }));

        let handler = boxed_handler(|req: Request<Full<Bytes>>, _| async move {
            let seen = req.headers().contains_key("x-pre");
            Ok(Response::new(Full::new(Bytes::from(seen.to_string()))))
        });

        let res = chain.build(handler, Env::default()).run(request()).await.unwrap();
        assert!(res.headers().contains_key("x-post"));
        assert_eq!(body_text(res).await, "true");
    }

    #[tokio::test]
    async fn should_stop_chain_when_pre_middleware_fails() {
        let called = Arc::new(AtomicBool::new(false));
        let seen = called.clone();

        let mut chain = Chain::new();
        chain.push(Middleware::pre(|_req, _env| async move { Err(Error::unauthorized("no token")) }));

        let handler = boxed_handler(move |_, _| {
            let seen = seen.clone();
            async move {
                seen.store(true, Ordering::SeqCst);
                Ok(Response::new(Full::new(Bytes::new())))
            }
        });

        let err = chain.build(handler, Env::default()).run(request()).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(!called.load(Ordering::SeqCst));
    }
}

use crate::env::Env;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

pub(crate) type Handler = Arc<dyn Fn(Request<Full<Bytes>>, Env) -> HandlerReturn + Send + Sync + 'static>;
pub(crate) type HandlerReturn = BoxFuture<'static, crate::Result<Response<Full<Bytes>>>>;

pub(crate) fn boxed_handler<H, R>(handler: H) -> Handler
where
    H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
    R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
{
    Arc::new(move |req: Request<Full<Bytes>>, env: Env| -> HandlerReturn { Box::pin(handler(req, env)) })
}

/// The per-method handlers registered for one route path.
///
/// A set holds at most one handler per method; adding a handler for a method that is
/// already present replaces it.
///
/// # Examples
///
/// ```
/// use deadlight_router::{Env, HandlerSet, Router};
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
///
/// async fn show_post(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
///     Ok(Response::new(Full::new(Bytes::from("post"))))
/// }
///
/// async fn update_post(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
///     Ok(Response::new(Full::new(Bytes::from("updated"))))
/// }
///
/// let router = Router::builder()
///     .register("/post/:id", HandlerSet::new().get(show_post).post(update_post))
///     .build()
///     .unwrap();
/// # let _ = router;
/// ```
#[derive(Clone, Default)]
pub struct HandlerSet {
    handlers: HashMap<Method, Handler>,
}

impl HandlerSet {
    pub fn new() -> HandlerSet {
        HandlerSet::default()
    }

    /// Adds a handler for the specified method.
    pub fn on<H, R>(mut self, method: Method, handler: H) -> HandlerSet
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.insert(method, boxed_handler(handler));
        self
    }

    pub fn get<H, R>(self, handler: H) -> HandlerSet
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.on(Method::GET, handler)
    }

    pub fn post<H, R>(self, handler: H) -> HandlerSet
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.on(Method::POST, handler)
    }

    pub fn put<H, R>(self, handler: H) -> HandlerSet
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.on(Method::PUT, handler)
    }

    pub fn patch<H, R>(self, handler: H) -> HandlerSet
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.on(Method::PATCH, handler)
    }

    pub fn delete<H, R>(self, handler: H) -> HandlerSet
    where
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.on(Method::DELETE, handler)
    }

    pub(crate) fn insert(&mut self, method: Method, handler: Handler) {
        self.handlers.insert(method, handler);
    }

    pub(crate) fn handler(&self, method: &Method) -> Option<&Handler> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.handlers.contains_key(method)
    }

    pub fn methods(&self) -> Vec<Method> {
        self.handlers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Debug for HandlerSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.handlers.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        write!(f, "{{ methods: {:?} }}", methods)
    }
}

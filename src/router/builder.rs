use crate::env::Env;
use crate::middleware::{Chain, Middleware};
use crate::route::{boxed_handler, HandlerSet, RouteTable};
use crate::router::Router;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

/// Builder for the [Router](./struct.Router.html) type.
///
/// This is the configuration phase of a router: routes and middleware are registered here
/// and [`build`](#method.build) turns them into an immutable `Router`. A template that
/// can't be compiled makes every later call a no-op and is reported by `build`.
///
/// # Examples
///
/// ```
/// use deadlight_router::{error_handler, Env, HandlerSet, Router};
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
///
/// async fn list_posts(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
///     Ok(Response::new(Full::new(Bytes::from("posts"))))
/// }
///
/// async fn create_post(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
///     Ok(Response::new(Full::new(Bytes::from("created"))))
/// }
///
/// fn run() -> Router {
///     Router::builder()
///         .middleware(error_handler())
///         .register("/posts", HandlerSet::new().get(list_posts).post(create_post))
///         .build()
///         .unwrap()
/// }
/// # run();
/// ```
pub struct RouterBuilder {
    inner: crate::Result<BuilderInner>,
}

struct BuilderInner {
    table: RouteTable,
    chain: Chain,
}

impl RouterBuilder {
    /// Creates a new RouterBuilder instance with default options.
    pub fn new() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Creates a new [Router](./struct.Router.html) instance from the added configuration.
    pub fn build(self) -> crate::Result<Router> {
        self.inner.and_then(|mut inner| {
            inner.table.init_regex_set()?;
            Ok(Router::new(inner.table, inner.chain))
        })
    }

    fn and_then<F: FnOnce(BuilderInner) -> crate::Result<BuilderInner>>(self, func: F) -> Self {
        RouterBuilder {
            inner: self.inner.and_then(func),
        }
    }
}

impl RouterBuilder {
    /// Registers a set of per-method handlers under a path template.
    ///
    /// Registering a template that is already present replaces its handlers and keeps its
    /// original position in the resolution order.
    pub fn register<P: Into<String>>(self, path: P, handlers: HandlerSet) -> Self {
        self.and_then(move |mut inner| {
            inner.table.register(path, handlers)?;
            Ok(inner)
        })
    }

    /// Adds a new route with `GET` method and the handler at the specified path.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::{Env, Router};
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Request, Response};
    ///
    /// async fn home_handler(req: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
    ///     Ok(Response::new(Full::new(Bytes::from("home"))))
    /// }
    ///
    /// # fn run() -> Router {
    /// let router = Router::builder()
    ///     .get("/", home_handler)
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    pub fn get<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.add(path, vec![Method::GET], handler)
    }

    /// Adds a new route with `POST` method and the handler at the specified path.
    pub fn post<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.add(path, vec![Method::POST], handler)
    }

    /// Adds a new route with `PUT` method and the handler at the specified path.
    pub fn put<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.add(path, vec![Method::PUT], handler)
    }

    /// Adds a new route with `PATCH` method and the handler at the specified path.
    pub fn patch<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.add(path, vec![Method::PATCH], handler)
    }

    /// Adds a new route with `DELETE` method and the handler at the specified path.
    pub fn delete<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        self.add(path, vec![Method::DELETE], handler)
    }

    /// Adds one handler for several methods at the specified path.
    ///
    /// Each method is merged into the handler set of an already registered identical template.
    pub fn add<P, H, R>(self, path: P, methods: Vec<Method>, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
        R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
    {
        let handler = boxed_handler(handler);
        let path = path.into();

        self.and_then(move |mut inner| {
            for method in methods {
                inner.table.add(path.as_str(), method, handler.clone())?;
            }
            Ok(inner)
        })
    }

    /// Appends a middleware. Middleware run in the order they are added, the first one outermost.
    pub fn middleware(self, m: Middleware) -> Self {
        self.and_then(move |mut inner| {
            inner.chain.push(m);
            Ok(inner)
        })
    }
}

impl Default for RouterBuilder {
    fn default() -> RouterBuilder {
        RouterBuilder {
            inner: Ok(BuilderInner {
                table: RouteTable::new(),
                chain: Chain::new(),
            }),
        }
    }
}

impl Debug for RouterBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.inner {
            Ok(ref inner) => write!(
                f,
                "{{ routes: {:?}, middlewares: {} }}",
                inner.table.routes(),
                inner.chain.len()
            ),
            Err(ref err) => write!(f, "{{ error: {} }}", err),
        }
    }
}

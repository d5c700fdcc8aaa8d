//! `deadlight-router` is the request router of the deadlight blog and webmail worker, built on
//! the Rust HTTP library [hyper](https://hyper.rs/).
//!
//! Its core features:
//!
//! - Path templates with `:name` placeholders, compiled to anchored regular expressions and
//!   resolved in registration order with a [`RegexSet`](https://docs.rs/regex/1/regex/struct.RegexSet.html)
//!
//! - An ordered middleware chain where every middleware decides whether, and with which
//!   request, the rest of the chain runs
//!
//! - A shared [`Env`](./struct.Env.html) carrying the configuration, secrets, a KV store and
//!   a request log sink to every middleware and handler
//!
//! - Built-in error, request logging and session auth middleware
//!
//! ## Basic Example
//!
//! ```no_run
//! use deadlight_router::prelude::*;
//! use deadlight_router::{error_handler, request_logger, Config, Env, Router, RouterService};
//! use http_body_util::Full;
//! use hyper::body::Bytes;
//! use hyper::service::Service;
//! use hyper::{Request, Response};
//! use hyper_util::rt::{TokioExecutor, TokioIo};
//! use hyper_util::server::conn::auto::Builder;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! // A handler for "/" page.
//! async fn home_handler(_: Request<Full<Bytes>>, env: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
//!     Ok(Response::new(Full::new(Bytes::from(format!("Home page ({})", env.environment())))))
//! }
//!
//! // A handler for "/users/:userId" page.
//! async fn user_handler(req: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
//!     let user_id = req.param("userId").unwrap();
//!     Ok(Response::new(Full::new(Bytes::from(format!("Hello {}", user_id)))))
//! }
//!
//! fn router() -> Router {
//!     Router::builder()
//!         // The error middleware goes first so that it sees every error.
//!         .middleware(error_handler())
//!         .middleware(request_logger())
//!         .get("/", home_handler)
//!         .get("/users/:userId", user_handler)
//!         .build()
//!         .unwrap()
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let env = Env::new(Config::default());
//!     let service = Arc::new(RouterService::new(router(), env));
//!
//!     let listener = TcpListener::bind("127.0.0.1:3001").await?;
//!
//!     loop {
//!         let (stream, _) = listener.accept().await?;
//!         let service = service.clone();
//!
//!         tokio::spawn(async move {
//!             let request_service = service.call(&stream).await.unwrap();
//!             let io = TokioIo::new(stream);
//!
//!             let builder = Builder::new(TokioExecutor::new());
//!             if let Err(err) = builder.serve_connection(io, request_service).await {
//!                 eprintln!("Error serving connection: {:?}", err);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! ## Routing
//!
//! ### Route Handlers
//!
//! A handler is a function or closure which takes the request and the [`Env`](./struct.Env.html)
//! and returns a future resolving to a response or an [`Error`](./enum.Error.html). The request
//! body is fully buffered before routing, so handlers always see a `Request<Full<Bytes>>`.
//!
//! ```
//! use deadlight_router::{Env, Router};
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Request, Response};
//!
//! async fn about(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
//!     Ok(Response::new(Full::new(Bytes::from("About"))))
//! }
//!
//! # fn run() -> Router {
//! let router = Router::builder()
//!     .get("/about", about)
//!     .post("/comments", |_, _| async { Ok(Response::new(Full::new(Bytes::from("Saved")))) })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### Route Paths
//!
//! A template starts with `/` and every segment is either literal text or a whole-segment
//! `:name` placeholder. A template matches the whole request path, trailing slash included,
//! so `/post/:id` matches `/post/42` but neither `/post/42/` nor `/post/42/edit`.
//!
//! Routes are tried in the order they were registered and the first one that matches the
//! path and has a handler for the request method wins. There is no specificity ranking:
//! register `/x/special` before `/x/:id` if it should take precedence.
//!
//! A request that matches no route, or only routes without a handler for its method, runs
//! the middleware chain around a terminal that fails with
//! [`Error::NotFound`](./enum.Error.html#variant.NotFound). There is no `405` response.
//!
//! ### Route Parameters
//!
//! The request path is percent-decoded before matching, so an encoded `/` separates
//! segments like a literal one. Matched placeholders are available through
//! [`RequestExt::params`](./ext/trait.RequestExt.html#tymethod.params); the query string is
//! parsed for every request and available through
//! [`RequestExt::query`](./ext/trait.RequestExt.html#tymethod.query).
//!
//! ```
//! use deadlight_router::prelude::*;
//! use deadlight_router::{Env, Router};
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Request, Response};
//!
//! # fn run() -> Router {
//! let router = Router::builder()
//!     .get("/posts/:slug", |req: Request<Full<Bytes>>, _: Env| async move {
//!         let slug = req.param("slug").unwrap();
//!         let page = req.query_param("page").map(String::as_str).unwrap_or("1");
//!         Ok(Response::new(Full::new(Bytes::from(format!("{} page {}", slug, page)))))
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ## Middleware
//!
//! Middleware run in registration order. The first registered is the outermost: it sees
//! the request first and the response last. An around middleware receives a
//! [`Next`](./struct.Next.html) and calls [`Next::run`](./struct.Next.html#method.run) to
//! continue; returning without running it short-circuits the rest of the chain.
//!
//! ```
//! use deadlight_router::{Env, Middleware, Next, Router};
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Request, Response};
//!
//! async fn timing(req: Request<Full<Bytes>>, _: Env, next: Next) -> deadlight_router::Result<Response<Full<Bytes>>> {
//!     let start = std::time::Instant::now();
//!     let res = next.run(req).await;
//!     println!("took {:?}", start.elapsed());
//!     res
//! }
//!
//! # fn run() -> Router {
//! let router = Router::builder()
//!     .middleware(Middleware::new(timing))
//!     .middleware(Middleware::pre(|req, _env| async move { Ok(req) }))
//!     .middleware(Middleware::post(|res, _env| async move { Ok(res) }))
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### The built-in Middleware
//!
//! - [`error_handler`](./fn.error_handler.html): turns any error into a `text/plain`
//!   response with the mapped status code. Register it first.
//! - [`request_logger`](./fn.request_logger.html): emits one `tracing` event per request
//!   and records it into the environment's request log sink.
//! - [`require_session`](./fn.require_session.html): requires a session for a path prefix.
//!   The handler wrappers [`protected`](./fn.protected.html) and
//!   [`admin_only`](./fn.admin_only.html) do the same per route.
//!
//! ## Error Handling
//!
//! Handlers and middleware return [`Error`](./enum.Error.html). The router itself never
//! translates errors into responses: without the error middleware they reach the service
//! layer, which answers with a bare `500`.

pub use self::config::{Config, Environment, LogConfig, ServerConfig};
pub use self::env::{Env, EnvBuilder, KvStore, MemoryKv, MemoryLogSink, RequestLog, RequestLogSink};
pub use self::error::{Error, RouteError};
pub use self::middleware::{
    admin_only, create_session, current_user, error_handler, protected, request_logger, require_session,
    AroundMiddleware, CurrentUser, Middleware, Next, PostMiddleware, PreMiddleware, Session,
};
pub use self::route::{HandlerSet, Route};
pub use self::router::{Router, RouterBuilder};
#[doc(hidden)]
pub use self::service::RequestService;
pub use self::service::RequestServiceBuilder;
pub use self::service::RouterService;
pub use self::types::{QueryParams, RouteParams};

mod config;
mod constants;
mod data_map;
mod env;
mod error;
pub mod ext;
mod helpers;
mod middleware;
pub mod prelude;
mod regex_generator;
mod route;
mod router;
mod service;
pub mod telemetry;
mod types;

/// A Result type often returned from methods that can fail with a router [`Error`](./enum.Error.html).
pub type Result<T> = std::result::Result<T, Error>;

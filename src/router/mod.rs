use crate::env::Env;
use crate::helpers;
use crate::middleware::Chain;
use crate::route::{boxed_handler, Handler, Route, RouteTable};
use crate::types::{QueryParams, RequestMeta, RouteParams};
use crate::Error;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use tracing::{debug, trace};

pub use self::builder::RouterBuilder;

mod builder;

/// Represents a modular, lightweight router which resolves every request to a route
/// handler and runs the registered middleware around it.
///
/// A `Router` is created through [`Router::builder`](#method.builder). Building it ends the
/// configuration phase: the route table and the middleware list are immutable from then on,
/// so one router can serve concurrent requests through a shared reference.
///
/// # Examples
///
/// ```
/// use deadlight_router::{error_handler, request_logger, Env, Router};
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
///
/// async fn home(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
///     Ok(Response::new(Full::new(Bytes::from("home"))))
/// }
///
/// fn run() -> Router {
///     Router::builder()
///         // The error middleware goes first so that it wraps everything else.
///         .middleware(error_handler())
///         .middleware(request_logger())
///         .get("/", home)
///         .build()
///         .unwrap()
/// }
/// # run();
/// ```
pub struct Router {
    table: RouteTable,
    chain: Chain,
    not_found: Handler,
}

impl Router {
    pub(crate) fn new(table: RouteTable, chain: Chain) -> Router {
        Router {
            table,
            chain,
            not_found: boxed_handler(|req: Request<Full<Bytes>>, _env: Env| async move {
                Err(Error::not_found(req.method().clone(), req.uri().path()))
            }),
        }
    }

    /// Return a [RouterBuilder](./struct.RouterBuilder.html) instance to build a `Router`.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Handles one request.
    ///
    /// The percent-decoded path is resolved against the routes in registration order; the
    /// first route that matches the whole path and has a handler for the request method wins.
    /// The route params and the parsed query string are attached to the request, then the
    /// middleware chain runs around the handler and its result is returned as is.
    ///
    /// An unmatched request runs the same chain around a terminal that fails with
    /// [`Error::NotFound`](./enum.Error.html#variant.NotFound). That includes a matched path
    /// with an unregistered method and a path that doesn't decode to UTF-8. The router
    /// translates no errors itself: without an error middleware they are returned to the
    /// caller.
    pub async fn handle(&self, mut req: Request<Full<Bytes>>, env: Env) -> crate::Result<Response<Full<Bytes>>> {
        let query = QueryParams::parse(req.uri().query().unwrap_or(""));

        let found = match helpers::percent_decode_request_path(req.uri().path()) {
            Ok(target_path) => self.table.lookup(target_path.as_str(), req.method()),
            Err(err) => {
                debug!(path = req.uri().path(), error = %err, "couldn't percent decode request path");
                None
            }
        };

        let (handler, params) = match found {
            Some(m) => {
                trace!(method = %req.method(), path = req.uri().path(), route = m.route.path(), "route matched");
                (m.handler, m.params)
            }
            None => {
                trace!(method = %req.method(), path = req.uri().path(), "no route matched");
                (self.not_found.clone(), RouteParams::new())
            }
        };

        helpers::update_req_meta_in_extensions(req.extensions_mut(), RequestMeta::with_route_params(params, query));

        self.chain.build(handler, env).run(req).await
    }

    /// The registered routes in resolution order.
    pub fn routes(&self) -> &[Route] {
        self.table.routes()
    }

    pub fn middleware_count(&self) -> usize {
        self.chain.len()
    }
}

impl Debug for Router {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ routes: {:?}, middlewares: {} }}",
            self.table.routes(),
            self.chain.len()
        )
    }
}

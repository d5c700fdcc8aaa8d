//! Extension traits for the request type.

use crate::middleware::CurrentUser;
use crate::types::{QueryParams, RequestMeta, RouteParams};
use hyper::Request;
use std::net::SocketAddr;

lazy_static::lazy_static! {
    static ref EMPTY_ROUTE_PARAMS: RouteParams = RouteParams::new();
    static ref EMPTY_QUERY: QueryParams = QueryParams::new();
}

/// A extension trait which extends the [`hyper::Request`](https://docs.rs/hyper/1/hyper/struct.Request.html)
/// type with the data attached by the router.
///
/// Params and query are populated before the middleware chain runs, so every middleware
/// and the handler see them.
pub trait RequestExt {
    /// It returns the route parameters as [RouteParams](../struct.RouteParams.html) type with the name of the parameter specified in the path as their respective keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlight_router::prelude::*;
    /// use deadlight_router::{Env, Router};
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response};
    ///
    /// let router = Router::builder()
    ///     .get("/users/:userName/books/:bookName", |req, _env: Env| async move {
    ///         let params = req.params();
    ///         let user_name = params.get("userName").unwrap();
    ///         let book_name = params.get("bookName").unwrap();
    ///
    ///         Ok(Response::new(Full::new(Bytes::from(format!(
    ///             "Username: {}, Book Name: {}",
    ///             user_name, book_name
    ///         )))))
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # let _ = router;
    /// ```
    fn params(&self) -> &RouteParams;

    /// It returns the route parameter value by the name of the parameter specified in the path.
    fn param<P: AsRef<str>>(&self, param_name: P) -> Option<&String>;

    /// The parsed query string. Empty when the request has none.
    fn query(&self) -> &QueryParams;

    fn query_param<P: AsRef<str>>(&self, name: P) -> Option<&String>;

    /// It returns the remote address of the incoming request, when served through the
    /// [`RouterService`](../struct.RouterService.html).
    fn remote_addr(&self) -> Option<SocketAddr>;

    /// The signed-in user, set by the session auth wrappers.
    fn current_user(&self) -> Option<&CurrentUser>;
}

fn req_meta<T>(req: &Request<T>) -> Option<&RequestMeta> {
    req.extensions().get::<RequestMeta>()
}

impl<T> RequestExt for Request<T> {
    fn params(&self) -> &RouteParams {
        req_meta(self)
            .and_then(RequestMeta::route_params)
            .unwrap_or(&EMPTY_ROUTE_PARAMS)
    }

    fn param<P: AsRef<str>>(&self, param_name: P) -> Option<&String> {
        self.params().get(param_name)
    }

    fn query(&self) -> &QueryParams {
        req_meta(self).and_then(RequestMeta::query).unwrap_or(&EMPTY_QUERY)
    }

    fn query_param<P: AsRef<str>>(&self, name: P) -> Option<&String> {
        self.query().get(name)
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        req_meta(self).and_then(RequestMeta::remote_addr).copied()
    }

    fn current_user(&self) -> Option<&CurrentUser> {
        self.extensions().get::<CurrentUser>()
    }
}

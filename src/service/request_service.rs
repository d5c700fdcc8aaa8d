use crate::env::Env;
use crate::helpers;
use crate::router::Router;
use crate::types::RequestMeta;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{service::Service, Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, warn};

/// A per-connection [`Service`](https://docs.rs/hyper/1/hyper/service/trait.Service.html)
/// which buffers the request body and hands the request to the router.
///
/// It never fails. A body larger than `server.max_body_bytes` is answered with
/// `413 Payload Too Large` without reaching the router. An error escaping the router (there
/// is no error middleware, or the body couldn't be read) is logged and answered with a bare
/// `500 Internal Server Error`.
pub struct RequestService {
    pub(crate) router: Arc<Router>,
    pub(crate) env: Env,
    pub(crate) remote_addr: SocketAddr,
    pub(crate) max_body_bytes: usize,
}

impl<T> Service<Request<T>> for RequestService
where
    T: Body<Data = Bytes> + Send + 'static,
    T::Error: Into<crate::RouteError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    #[allow(clippy::type_complexity)]
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<T>) -> Self::Future {
        let router = self.router.clone();
        let env = self.env.clone();
        let remote_addr = self.remote_addr;
        let max_body_bytes = self.max_body_bytes;

        let fut = async move {
            let method = req.method().clone();
            let path = req.uri().path().to_owned();

            let mut req = match buffer_body(req, max_body_bytes).await {
                Ok(req) => req,
                Err(err @ crate::Error::PayloadTooLarge { .. }) => {
                    warn!(error = %err, method = %method, path = %path, "rejected request body");
                    return Ok(bare_response(err.status_code()));
                }
                Err(err) => {
                    error!(error = %err, method = %method, path = %path, "couldn't read request body");
                    return Ok(bare_response(StatusCode::INTERNAL_SERVER_ERROR));
                }
            };

            helpers::update_req_meta_in_extensions(req.extensions_mut(), RequestMeta::with_remote_addr(remote_addr));

            match router.handle(req, env).await {
                Ok(res) => Ok(res),
                Err(err) => {
                    error!(error = %err, method = %method, path = %path, "unhandled error escaped the router");
                    Ok(bare_response(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        };

        Box::pin(fut)
    }
}

async fn buffer_body<T>(req: Request<T>, limit: usize) -> crate::Result<Request<Full<Bytes>>>
where
    T: Body<Data = Bytes>,
    T::Error: Into<crate::RouteError>,
{
    let (parts, body) = req.into_parts();
    let bytes = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                crate::Error::PayloadTooLarge { limit }
            } else {
                crate::Error::handler(e)
            }
        })?
        .to_bytes();

    Ok(Request::from_parts(parts, Full::new(bytes)))
}

fn bare_response(status: StatusCode) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or("Error");
    let mut res = Response::new(Full::new(Bytes::from_static(reason.as_bytes())));
    *res.status_mut() = status;
    res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    res
}

/// Creates a [`RequestService`](./struct.RequestService.html) for every accepted connection.
#[derive(Debug)]
pub struct RequestServiceBuilder {
    router: Arc<Router>,
    env: Env,
    max_body_bytes: usize,
}

impl RequestServiceBuilder {
    pub fn new(router: Router, env: Env) -> RequestServiceBuilder {
        let max_body_bytes = env.config().server.max_body_bytes;

        RequestServiceBuilder {
            router: Arc::new(router),
            env,
            max_body_bytes,
        }
    }

    pub fn build(&self, remote_addr: SocketAddr) -> RequestService {
        RequestService {
            router: self.router.clone(),
            env: self.env.clone(),
            remote_addr,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

use std::net::SocketAddr;

pub use self::query_params::QueryParams;
pub use self::route_params::RouteParams;

mod query_params;
mod route_params;

/// Per-request data the router attaches to the request extensions.
#[derive(Debug, Clone, Default)]
pub(crate) struct RequestMeta {
    route_params: Option<RouteParams>,
    query: Option<QueryParams>,
    remote_addr: Option<SocketAddr>,
}

impl RequestMeta {
    pub(crate) fn with_remote_addr(remote_addr: SocketAddr) -> RequestMeta {
        RequestMeta {
            remote_addr: Some(remote_addr),
            ..Default::default()
        }
    }

    pub(crate) fn with_route_params(route_params: RouteParams, query: QueryParams) -> RequestMeta {
        RequestMeta {
            route_params: Some(route_params),
            query: Some(query),
            remote_addr: None,
        }
    }

    pub(crate) fn route_params(&self) -> Option<&RouteParams> {
        self.route_params.as_ref()
    }

    pub(crate) fn query(&self) -> Option<&QueryParams> {
        self.query.as_ref()
    }

    pub(crate) fn remote_addr(&self) -> Option<&SocketAddr> {
        self.remote_addr.as_ref()
    }

    /// Fields set on `other` win.
    pub(crate) fn extend(&mut self, other: RequestMeta) {
        if let Some(route_params) = other.route_params {
            self.route_params = Some(route_params);
        }

        if let Some(query) = other.query {
            self.query = Some(query);
        }

        if let Some(remote_addr) = other.remote_addr {
            self.remote_addr = Some(remote_addr);
        }
    }
}

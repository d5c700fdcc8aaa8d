use crate::regex_generator::generate_exact_match_regex;
use crate::types::RouteParams;
use hyper::Method;
use regex::Regex;
use std::fmt::{self, Debug, Formatter};

pub use self::handler_set::HandlerSet;
pub(crate) use self::handler_set::{boxed_handler, Handler};
pub(crate) use self::table::RouteTable;

mod handler_set;
mod table;

/// Represents a single route: a compiled path template and its per-method handlers.
///
/// Routes shouldn't be created directly, use the [RouterBuilder](./struct.RouterBuilder.html)
/// methods to register one. Once the router is built a route is immutable.
pub struct Route {
    pub(crate) path: String,
    pub(crate) regex: Regex,
    route_params: Vec<String>,
    pub(crate) handlers: HandlerSet,
}

impl Route {
    pub(crate) fn new<P: Into<String>>(path: P, handlers: HandlerSet) -> crate::Result<Route> {
        let path = path.into();
        let (re, params) = generate_exact_match_regex(path.as_str())?;

        Ok(Route {
            path,
            regex: re,
            route_params: params,
            handlers,
        })
    }

    /// The template this route was registered with.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// The placeholder names in template order.
    pub fn param_names(&self) -> &[String] {
        &self.route_params
    }

    pub fn is_match(&self, target_path: &str) -> bool {
        self.regex.is_match(target_path)
    }

    pub(crate) fn is_match_method(&self, method: &Method) -> bool {
        self.handlers.contains(method)
    }

    /// Extracts the route params from the already decoded `target_path`, or `None` if the
    /// path doesn't match. Each value is the matched substring as is.
    pub(crate) fn match_params(&self, target_path: &str) -> Option<RouteParams> {
        let caps = self.regex.captures(target_path)?;

        let mut route_params = RouteParams::with_capacity(self.route_params.len());

        let mut iter = caps.iter();
        // Skip the first match because it's the whole path.
        iter.next();
        for param in &self.route_params {
            if let Some(Some(g)) = iter.next() {
                route_params.set(param.clone(), g.as_str());
            }
        }

        Some(route_params)
    }
}

impl Debug for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ path: {:?}, regex: {:?}, route_params: {:?}, handlers: {:?} }}",
            self.path, self.regex, self.route_params, self.handlers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::Response;

    fn route(path: &str) -> Route {
        let handlers = HandlerSet::new().get(|_, _| async { Ok(Response::new(Full::new(Bytes::new()))) });
        Route::new(path, handlers).unwrap()
    }

    #[test]
    fn should_extract_params_named_after_placeholders() {
        let params = route("/post/:id").match_params("/post/42").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        let route = route("/users/:userName/books/:bookName");
        assert_eq!(route.param_names(), &["userName".to_owned(), "bookName".to_owned()]);

        let params = route.match_params("/users/alice/books/Harry Potter").unwrap();
        assert_eq!(params.get("userName").map(String::as_str), Some("alice"));
        assert_eq!(params.get("bookName").map(String::as_str), Some("Harry Potter"));
    }

    #[test]
    fn should_not_match_other_paths() {
        let route = route("/post/:id");
        assert!(route.match_params("/post/").is_none());
        assert!(route.match_params("/post/1/").is_none());
        assert!(route.match_params("/posts/1").is_none());
        assert!(route.match_params("/post//").is_none());
        assert!(route.match_params("/post/a/b").is_none());

        let params = route.match_params("/post/%2F").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("%2F"));
    }

    #[test]
    fn should_report_registered_methods() {
        let route = route("/");
        assert!(route.is_match_method(&Method::GET));
        assert!(!route.is_match_method(&Method::DELETE));
        assert!(route.match_params("/").unwrap().is_empty());
    }
}

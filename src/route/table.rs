use super::{Handler, HandlerSet, Route};
use crate::types::RouteParams;
use crate::Error;
use hyper::Method;
use regex::RegexSet;
use tracing::debug;

/// The resolved route for one request.
pub(crate) struct RouteMatch<'a> {
    pub(crate) route: &'a Route,
    pub(crate) handler: Handler,
    pub(crate) params: RouteParams,
}

/// Routes in registration order.
///
/// Lookup is first-match-wins over that order: there is no specificity ranking, so a
/// parameterized route registered before a literal one shadows it.
#[derive(Debug, Default)]
pub(crate) struct RouteTable {
    routes: Vec<Route>,
    regex_set: Option<RegexSet>,
}

impl RouteTable {
    pub(crate) fn new() -> RouteTable {
        RouteTable::default()
    }

    /// Stores `handlers` under `path`. Registering the same template again replaces its
    /// handler set but keeps the original position.
    pub(crate) fn register<P: Into<String>>(&mut self, path: P, handlers: HandlerSet) -> crate::Result<()> {
        let path = path.into();
        debug!(path = %path, methods = ?handlers, "registering route");

        if let Some(existing) = self.routes.iter_mut().find(|r| r.path == path) {
            existing.handlers = handlers;
        } else {
            self.routes.push(Route::new(path, handlers)?);
        }

        self.regex_set = None;
        Ok(())
    }

    /// Adds a single method handler, merging into an existing route with the same template.
    pub(crate) fn add<P: Into<String>>(&mut self, path: P, method: Method, handler: Handler) -> crate::Result<()> {
        let path = path.into();

        if let Some(existing) = self.routes.iter_mut().find(|r| r.path == path) {
            existing.handlers.insert(method, handler);
            return Ok(());
        }

        let mut handlers = HandlerSet::new();
        handlers.insert(method, handler);
        self.register(path, handlers)
    }

    pub(crate) fn init_regex_set(&mut self) -> crate::Result<()> {
        let regex_set = RegexSet::new(self.routes.iter().map(|r| r.regex.as_str()))
            .map_err(|e| Error::InvalidRoute(format!("Couldn't create router RegexSet: {}", e)))?;
        self.regex_set = Some(regex_set);
        Ok(())
    }

    /// Returns the first route, in registration order, whose pattern matches `target_path`
    /// and which has a handler for `method`.
    ///
    /// A route that matches the path but lacks the method is skipped and the scan goes on.
    pub(crate) fn lookup(&self, target_path: &str, method: &Method) -> Option<RouteMatch<'_>> {
        match self.regex_set {
            // `SetMatches::iter` yields indices in ascending order.
            Some(ref regex_set) => regex_set
                .matches(target_path)
                .iter()
                .find_map(|idx| self.try_match(&self.routes[idx], target_path, method)),
            None => self
                .routes
                .iter()
                .find_map(|route| self.try_match(route, target_path, method)),
        }
    }

    fn try_match<'a>(&self, route: &'a Route, target_path: &str, method: &Method) -> Option<RouteMatch<'a>> {
        let handler = route.handlers.handler(method)?;
        let params = route.match_params(target_path)?;

        Some(RouteMatch {
            route,
            handler: handler.clone(),
            params,
        })
    }

    pub(crate) fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::boxed_handler;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{Request, Response};

    fn text_handler(text: &'static str) -> Handler {
        boxed_handler(move |_, _| async move { Ok(Response::new(Full::new(Bytes::from(text)))) })
    }

    async fn call(m: RouteMatch<'_>) -> String {
        let req = Request::new(Full::new(Bytes::new()));
        let res = (m.handler)(req, crate::Env::default()).await.unwrap();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn table(with_regex_set: bool) -> RouteTable {
        let mut table = RouteTable::new();
        table.add("/admin/edit/:id", Method::GET, text_handler("edit")).unwrap();
        table.add("/admin/delete/:id", Method::GET, text_handler("delete")).unwrap();
        table.add("/x/:id", Method::GET, text_handler("x-param")).unwrap();
        table.add("/x/special", Method::GET, text_handler("x-special")).unwrap();
        table.add("/x/special", Method::POST, text_handler("x-special-post")).unwrap();
        if with_regex_set {
            table.init_regex_set().unwrap();
        }
        table
    }

    #[tokio::test]
    async fn should_not_cross_match_literal_segments() {
        for with_set in [true, false] {
            let table = table(with_set);
            let m = table.lookup("/admin/edit/7", &Method::GET).unwrap();
            assert_eq!(m.route.path(), "/admin/edit/:id");
            assert_eq!(m.params.get("id").map(String::as_str), Some("7"));
            assert_eq!(call(m).await, "edit");
        }
    }

    #[tokio::test]
    async fn should_resolve_ambiguous_paths_to_first_registered() {
        for with_set in [true, false] {
            let table = table(with_set);
            let m = table.lookup("/x/special", &Method::GET).unwrap();
            assert_eq!(m.route.path(), "/x/:id");
            assert_eq!(m.params.get("id").map(String::as_str), Some("special"));
        }
    }

    #[tokio::test]
    async fn should_skip_routes_without_the_method() {
        let table = table(true);
        let m = table.lookup("/x/special", &Method::POST).unwrap();
        assert_eq!(m.route.path(), "/x/special");
        assert_eq!(call(m).await, "x-special-post");
    }

    #[test]
    fn should_return_none_for_unknown_path_or_method() {
        let table = table(true);
        assert!(table.lookup("/nope", &Method::GET).is_none());
        assert!(table.lookup("/admin/edit/7", &Method::DELETE).is_none());
        assert!(table.lookup("/admin/edit/7/", &Method::GET).is_none());
    }

    #[test]
    fn should_replace_handlers_in_place() {
        let mut table = table(false);
        table
            .register("/admin/edit/:id", HandlerSet::new().on(Method::PUT, |_, _| async {
                Ok(Response::new(Full::new(Bytes::new())))
            }))
            .unwrap();

        assert_eq!(table.routes().len(), 4);
        assert_eq!(table.routes()[0].path(), "/admin/edit/:id");
        assert!(table.lookup("/admin/edit/1", &Method::GET).is_none());
        assert!(table.lookup("/admin/edit/1", &Method::PUT).is_some());
    }

    #[test]
    fn should_reject_invalid_template() {
        let mut table = RouteTable::new();
        assert!(table.add("no-slash", Method::GET, text_handler("")).is_err());
        assert!(table.routes().is_empty());
    }
}

use std::collections::hash_map::Iter;
use std::collections::HashMap;

/// The parsed query string of a request, populated by the router before the middleware chain runs.
///
/// It can be accessed as `req.query()`. A key repeated in the query string keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn new() -> QueryParams {
        QueryParams(HashMap::new())
    }

    /// Parses an `application/x-www-form-urlencoded` query string, without the leading `?`.
    pub fn parse(query: &str) -> QueryParams {
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn set<N: Into<String>, V: Into<String>>(&mut self, name: N, val: V) {
        self.0.insert(name.into(), val.into());
    }

    pub fn get<N: AsRef<str>>(&self, name: N) -> Option<&String> {
        self.0.get(name.as_ref())
    }

    pub fn has<N: AsRef<str>>(&self, name: N) -> bool {
        self.0.contains_key(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = QueryParams::new();
        for (k, v) in iter {
            query.set(k, v);
        }
        query
    }
}

use dashmap::DashMap;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt::{self, Debug, Formatter};

/// A KV-like storage binding, the way the host platform exposes one to the worker.
///
/// Values are opaque strings; callers serialize structured values themselves.
pub trait KvStore: Send + Sync + 'static {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, crate::Result<Option<String>>>;

    fn put<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, crate::Result<()>>;

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, crate::Result<()>>;
}

/// In-process `KvStore` used for local runs and tests.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> MemoryKv {
        MemoryKv::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, crate::Result<Option<String>>> {
        let val = self.entries.get(key).map(|v| v.value().clone());
        future::ready(Ok(val)).boxed()
    }

    fn put<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, crate::Result<()>> {
        self.entries.insert(key.to_owned(), value);
        future::ready(Ok(())).boxed()
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, crate::Result<()>> {
        self.entries.remove(key);
        future::ready(Ok(())).boxed()
    }
}

impl Debug for MemoryKv {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ MemoryKv: {} entries }}", self.entries.len())
    }
}

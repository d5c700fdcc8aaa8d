use crate::config::{Config, Environment};
use crate::data_map::DataMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

pub use self::kv::{KvStore, MemoryKv};
pub use self::request_log::{MemoryLogSink, RequestLog, RequestLogSink};

mod kv;
mod request_log;

/// The shared environment handed to every middleware and route handler.
///
/// It bundles the external bindings of the process: the loaded configuration and its
/// secrets, a [`KvStore`](./trait.KvStore.html), an optional
/// [`RequestLogSink`](./trait.RequestLogSink.html) and any typed data registered through
/// [`EnvBuilder::data`](./struct.EnvBuilder.html#method.data) (a database handle, for
/// instance).
///
/// Cloning is cheap. The router only reads and forwards it.
///
/// # Examples
///
/// ```
/// use deadlight_router::{Config, Env, MemoryKv};
///
/// struct Db(&'static str);
///
/// let env = Env::builder(Config::default())
///     .kv(MemoryKv::new())
///     .data(Db("blog.sqlite"))
///     .build();
///
/// assert_eq!(env.data::<Db>().unwrap().0, "blog.sqlite");
/// ```
#[derive(Clone)]
pub struct Env {
    inner: Arc<EnvInner>,
}

struct EnvInner {
    config: Config,
    kv: Arc<dyn KvStore>,
    request_log: Option<Arc<dyn RequestLogSink>>,
    data: DataMap,
}

impl Env {
    /// Creates an environment with an in-memory KV store and no request log sink.
    pub fn new(config: Config) -> Env {
        Env::builder(config).build()
    }

    pub fn builder(config: Config) -> EnvBuilder {
        EnvBuilder {
            config,
            kv: None,
            request_log: None,
            data: DataMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn environment(&self) -> Environment {
        self.inner.config.environment
    }

    pub fn secret(&self, name: &str) -> Option<&str> {
        self.inner.config.secret(name)
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.inner.kv.as_ref()
    }

    pub fn request_log(&self) -> Option<&dyn RequestLogSink> {
        self.inner.request_log.as_deref()
    }

    /// Returns the binding registered for type `T`.
    pub fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.data.get::<T>()
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new(Config::default())
    }
}

impl Debug for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ environment: {}, request_log: {:?}, data: {:?} }}",
            self.inner.config.environment, self.inner.request_log, self.inner.data
        )
    }
}

/// Builder for [`Env`](./struct.Env.html).
pub struct EnvBuilder {
    config: Config,
    kv: Option<Arc<dyn KvStore>>,
    request_log: Option<Arc<dyn RequestLogSink>>,
    data: DataMap,
}

impl EnvBuilder {
    pub fn kv<K: KvStore>(self, kv: K) -> Self {
        self.shared_kv(Arc::new(kv))
    }

    pub fn shared_kv(mut self, kv: Arc<dyn KvStore>) -> Self {
        self.kv = Some(kv);
        self
    }

    /// Sets the sink the logging middleware records completed requests into.
    pub fn request_log(mut self, sink: Arc<dyn RequestLogSink>) -> Self {
        self.request_log = Some(sink);
        self
    }

    /// Registers a typed binding. A second value of the same type replaces the first.
    pub fn data<T: Send + Sync + 'static>(mut self, data: T) -> Self {
        self.data.insert(data);
        self
    }

    pub fn build(self) -> Env {
        Env {
            inner: Arc::new(EnvInner {
                config: self.config,
                kv: self.kv.unwrap_or_else(|| Arc::new(MemoryKv::new())),
                request_log: self.request_log,
                data: self.data,
            }),
        }
    }
}

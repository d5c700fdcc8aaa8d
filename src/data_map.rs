use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

/// Typed bindings held by the shared environment, one value per type.
#[derive(Default)]
pub(crate) struct DataMap {
    inner: HashMap<TypeId, Box<dyn Any + Send + Sync + 'static>>,
}

impl DataMap {
    pub fn new() -> DataMap {
        DataMap { inner: HashMap::new() }
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, val: T) {
        self.inner.insert(TypeId::of::<T>(), Box::new(val));
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.get(&TypeId::of::<T>()).and_then(|b| b.downcast_ref::<T>())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Debug for DataMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ DataMap: {} entries }}", self.len())
    }
}

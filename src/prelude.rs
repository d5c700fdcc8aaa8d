//! Import the traits needed to access the router's request data:
//!
//! ```
//! use deadlight_router::prelude::*;
//! ```

pub use crate::ext::RequestExt;

pub(crate) const HEADER_CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub(crate) const HEADER_X_REAL_IP: &str = "x-real-ip";
pub(crate) const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";
pub(crate) const HEADER_CF_IPCOUNTRY: &str = "cf-ipcountry";

pub(crate) const UNKNOWN: &str = "unknown";

pub(crate) const SESSION_COOKIE: &str = "session";
pub(crate) const SESSION_KEY_PREFIX: &str = "session:";

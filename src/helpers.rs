use crate::types::RequestMeta;
use http::Extensions;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::str::Utf8Error;

pub(crate) fn update_req_meta_in_extensions(ext: &mut Extensions, req_meta: RequestMeta) {
    if let Some(existing_req_meta) = ext.get_mut::<RequestMeta>() {
        existing_req_meta.extend(req_meta);
    } else {
        ext.insert(req_meta);
    }
}

/// Decodes the request path before it is matched against the route templates.
pub(crate) fn percent_decode_request_path(val: &str) -> Result<String, Utf8Error> {
    percent_decode_str(val).decode_utf8().map(Cow::into_owned)
}

/// Reads one cookie value out of a `Cookie` header.
pub(crate) fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

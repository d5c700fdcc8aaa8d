use super::{Middleware, Next};
use crate::constants::{HEADER_CF_CONNECTING_IP, HEADER_CF_IPCOUNTRY, HEADER_X_FORWARDED_FOR, HEADER_X_REAL_IP, UNKNOWN};
use crate::env::{Env, RequestLog};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, REFERER, USER_AGENT};
use hyper::{Request, Response, StatusCode};
use std::time::Instant;
use tracing::{info, warn};

/// Creates the request logging middleware.
///
/// Register it right after the [error middleware](./fn.error_handler.html). Each completed
/// request is emitted as a `tracing` event and recorded into the environment's
/// [`RequestLogSink`](../trait.RequestLogSink.html), if one is bound. Errors from the inner
/// chain are logged with their mapped status and message and passed through untouched.
pub fn request_logger() -> Middleware {
    Middleware::new(log_request)
}

async fn log_request(req: Request<Full<Bytes>>, env: Env, next: Next) -> crate::Result<Response<Full<Bytes>>> {
    let start = Instant::now();
    let mut entry = collect(&req);

    let result = next.run(req).await;

    entry.duration_ms = start.elapsed().as_millis() as u64;
    let (status, error) = match result {
        Ok(ref res) => (res.status(), failure_reason(res.status())),
        Err(ref err) => (err.status_code(), Some(err.to_string())),
    };
    entry.status = status.as_u16();
    entry.error = error;

    match result {
        Ok(_) => info!(
            method = %entry.method,
            path = %entry.path,
            status = entry.status,
            duration_ms = entry.duration_ms,
            ip = %entry.ip,
            "request completed"
        ),
        Err(ref err) => warn!(
            method = %entry.method,
            path = %entry.path,
            status = entry.status,
            duration_ms = entry.duration_ms,
            ip = %entry.ip,
            error = %err,
            "request failed"
        ),
    }

    if let Some(sink) = env.request_log() {
        sink.record(entry);
    }

    result
}

fn collect<T>(req: &Request<T>) -> RequestLog {
    let headers = req.headers();

    RequestLog {
        path: req.uri().path().to_owned(),
        method: req.method().as_str().to_owned(),
        duration_ms: 0,
        status: 0,
        user_agent: header_str(headers, USER_AGENT.as_str()).map(str::to_owned),
        ip: client_ip(headers).to_owned(),
        referer: header_str(headers, REFERER.as_str()).unwrap_or("").to_owned(),
        country: header_str(headers, HEADER_CF_IPCOUNTRY).unwrap_or(UNKNOWN).to_owned(),
        error: None,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The client address as reported by the edge, falling back through the proxy headers.
pub(crate) fn client_ip(headers: &HeaderMap) -> &str {
    [HEADER_CF_CONNECTING_IP, HEADER_X_REAL_IP, HEADER_X_FORWARDED_FOR]
        .iter()
        .find_map(|name| header_str(headers, name))
        .unwrap_or(UNKNOWN)
}

fn failure_reason(status: StatusCode) -> Option<String> {
    if status.is_success() {
        None
    } else {
        Some(status.canonical_reason().unwrap_or("Unknown").to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::env::MemoryLogSink;
    use crate::{error_handler, Error, Router};
    use std::sync::Arc;

    fn router() -> Router {
        Router::builder()
            .middleware(error_handler())
            .middleware(request_logger())
            .get("/post/:id", |_, _| async { Ok(Response::new(Full::new(Bytes::from("post")))) })
            .get("/secret", |_, _| async { Err(Error::unauthorized("no session")) })
            .build()
            .unwrap()
    }

    fn env(sink: &Arc<MemoryLogSink>) -> Env {
        Env::builder(Config::default()).request_log(sink.clone()).build()
    }

    #[tokio::test]
    async fn should_record_completed_request() {
        let sink = Arc::new(MemoryLogSink::new());
        let req = Request::builder()
            .uri("/post/7?draft=1")
            .header(USER_AGENT, "curl/8.0")
            .header(REFERER, "https://deadlight.boo/")
            .header(HEADER_X_REAL_IP, "10.0.0.2")
            .header(HEADER_CF_CONNECTING_IP, "203.0.113.9")
            .header(HEADER_CF_IPCOUNTRY, "NL")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let res = router().handle(req, env(&sink)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.path, "/post/7");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.ip, "203.0.113.9");
        assert_eq!(entry.referer, "https://deadlight.boo/");
        assert_eq!(entry.country, "NL");
        assert_eq!(entry.error, None);
    }

    #[tokio::test]
    async fn should_record_failures_and_pass_errors_through() {
        let sink = Arc::new(MemoryLogSink::new());

        let req = Request::builder().uri("/secret").body(Full::new(Bytes::new())).unwrap();
        let res = router().handle(req, env(&sink)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder().uri("/nowhere").body(Full::new(Bytes::new())).unwrap();
        let res = router().handle(req, env(&sink)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, 401);
        assert_eq!(entries[0].error.as_deref(), Some("Unauthorized: no session"));
        assert_eq!(entries[0].ip, "unknown");
        assert_eq!(entries[0].country, "unknown");
        assert_eq!(entries[0].referer, "");
        assert_eq!(entries[1].status, 404);
        assert_eq!(entries[1].error.as_deref(), Some("Not Found: GET /nowhere"));
    }

    #[test]
    fn should_fall_back_through_ip_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");

        headers.insert(HEADER_X_FORWARDED_FOR, "198.51.100.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.1");

        headers.insert(HEADER_X_REAL_IP, "198.51.100.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.2");
    }
}

use self::support::{empty, into_text, serve};
use chrono::Duration;
use deadlight_router::prelude::*;
use deadlight_router::{
    admin_only, create_session, error_handler, protected, request_logger, Config, CurrentUser, Env, Environment,
    Error, HandlerSet, MemoryLogSink, Middleware, Next, Router,
};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, COOKIE, HeaderValue};
use hyper::{Request, Response, StatusCode};
use std::sync::{Arc, Mutex};

mod support;

fn text<S: Into<String>>(s: S) -> deadlight_router::Result<Response<Full<Bytes>>> {
    Ok(Response::new(Full::new(Bytes::from(s.into()))))
}

#[tokio::test]
async fn can_route_params_and_query_over_http() {
    let router = Router::builder()
        .middleware(error_handler())
        .get("/post/:id", |req: Request<Full<Bytes>>, _| async move {
            let id = req.param("id").unwrap().clone();
            let page = req.query_param("page").cloned().unwrap_or_default();
            text(format!("post {} page {}", id, page))
        })
        .get("/admin/edit/:id", |req: Request<Full<Bytes>>, _| async move {
            text(format!("edit {}", req.param("id").unwrap()))
        })
        .get("/admin/delete/:id", |req: Request<Full<Bytes>>, _| async move {
            text(format!("delete {}", req.param("id").unwrap()))
        })
        .build()
        .unwrap();

    let serve = serve(router, Env::default()).await;

    let res = serve
        .send(serve.new_request("GET", "/post/42?page=2&sort=asc").body(empty()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(into_text(res.into_body()).await, "post 42 page 2");

    let res = serve
        .send(serve.new_request("GET", "/admin/delete/7").body(empty()).unwrap())
        .await;
    assert_eq!(into_text(res.into_body()).await, "delete 7");

    let res = serve
        .send(serve.new_request("GET", "/admin/edit/7").body(empty()).unwrap())
        .await;
    assert_eq!(into_text(res.into_body()).await, "edit 7");

    serve.shutdown();
}

#[tokio::test]
async fn can_map_unmatched_requests_to_404() {
    let router = Router::builder()
        .middleware(error_handler())
        .get("/post/:id", |_, _| async { text("post") })
        .build()
        .unwrap();

    let env = Env::new(Config {
        environment: Environment::Production,
        ..Config::default()
    });
    let serve = serve(router, env).await;

    for (method, uri) in [("GET", "/nope"), ("DELETE", "/post/1"), ("GET", "/post/1/")] {
        let res = serve.send(serve.new_request(method, uri).body(empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(res.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(into_text(res.into_body()).await, "Resource not found");
    }

    serve.shutdown();
}

#[tokio::test]
async fn can_answer_500_without_error_middleware() {
    let router = Router::builder()
        .get("/fail", |_, _| async { Err(Error::internal("database unavailable")) })
        .build()
        .unwrap();

    let serve = serve(router, Env::default()).await;

    let res = serve.send(serve.new_request("GET", "/fail").body(empty()).unwrap()).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(into_text(res.into_body()).await, "Internal Server Error");

    serve.shutdown();
}

#[tokio::test]
async fn can_pass_request_body_and_remote_addr() {
    let router = Router::builder()
        .register(
            "/comments",
            HandlerSet::new().post(|req: Request<Full<Bytes>>, _| async move {
                let ip = req.remote_addr().map(|a| a.ip().to_string()).unwrap_or_default();
                let body = into_text(req.into_body()).await;
                text(format!("{} {}", ip, body))
            }),
        )
        .build()
        .unwrap();

    let serve = serve(router, Env::default()).await;

    let req = serve
        .new_request("POST", "/comments")
        .body(Full::new(Bytes::from("first!")))
        .unwrap();
    let res = serve.send(req).await;
    assert_eq!(into_text(res.into_body()).await, "127.0.0.1 first!");

    serve.shutdown();
}

#[tokio::test]
async fn can_reject_body_over_configured_limit() {
    let router = Router::builder()
        .middleware(error_handler())
        .post("/comments", |req: Request<Full<Bytes>>, _| async move {
            let body = into_text(req.into_body()).await;
            text(format!("{} bytes", body.len()))
        })
        .build()
        .unwrap();

    let mut config = Config::default();
    config.server.max_body_bytes = 16;
    let serve = serve(router, Env::new(config)).await;

    let req = serve
        .new_request("POST", "/comments")
        .body(Full::new(Bytes::from(vec![b'x'; 64])))
        .unwrap();
    let res = serve.send(req).await;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = serve
        .new_request("POST", "/comments")
        .body(Full::new(Bytes::from(vec![b'x'; 16])))
        .unwrap();
    let res = serve.send(req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(into_text(res.into_body()).await, "16 bytes");

    serve.shutdown();
}

#[tokio::test]
async fn can_run_middleware_around_handler_in_order() {
    let trace: Arc<Mutex<Vec<String>>> = Arc::default();

    let recorder = |name: &'static str| {
        let trace = trace.clone();
        Middleware::new(move |req, _env, next: Next| {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push(format!("{}-in", name));
                let res = next.run(req).await;
                trace.lock().unwrap().push(format!("{}-out", name));
                res
            }
        })
    };

    let handler_trace = trace.clone();
    let router = Router::builder()
        .middleware(recorder("M1"))
        .middleware(recorder("M2"))
        .get("/", move |_, _| {
            let trace = handler_trace.clone();
            async move {
                trace.lock().unwrap().push("H".to_owned());
                text("home")
            }
        })
        .build()
        .unwrap();

    let serve = serve(router, Env::default()).await;
    let res = serve.send(serve.new_request("GET", "/").body(empty()).unwrap()).await;
    assert_eq!(into_text(res.into_body()).await, "home");
    assert_eq!(*trace.lock().unwrap(), vec!["M1-in", "M2-in", "H", "M2-out", "M1-out"]);

    serve.shutdown();
}

#[tokio::test]
async fn can_protect_routes_with_sessions() {
    async fn inbox(req: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
        text(format!("inbox of {}", req.current_user().unwrap().username))
    }

    let router = Router::builder()
        .middleware(error_handler())
        .middleware(request_logger())
        .get("/inbox", protected(inbox))
        .get("/admin", admin_only(inbox))
        .build()
        .unwrap();

    let sink = Arc::new(MemoryLogSink::new());
    let env = Env::builder(Config::default()).request_log(sink.clone()).build();

    let user = CurrentUser {
        user_id: 7,
        username: "bob".to_owned(),
        is_admin: false,
    };
    let session_id = create_session(&env, &user, Duration::hours(1)).await.unwrap();
    let cookie = HeaderValue::from_str(&format!("session={}", session_id)).unwrap();

    let serve = serve(router, env).await;

    let res = serve.send(serve.new_request("GET", "/inbox").body(empty()).unwrap()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = serve
        .new_request("GET", "/inbox")
        .header(COOKIE, cookie.clone())
        .body(empty())
        .unwrap();
    let res = serve.send(req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(into_text(res.into_body()).await, "inbox of bob");

    let req = serve
        .new_request("GET", "/admin")
        .header(COOKIE, cookie)
        .body(empty())
        .unwrap();
    let res = serve.send(req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let statuses: Vec<u16> = sink.entries().iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![401, 200, 401]);

    serve.shutdown();
}

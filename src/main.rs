use clap::Parser;
use deadlight_router::prelude::*;
use deadlight_router::{
    admin_only, error_handler, request_logger, telemetry, Config, Env, MemoryLogSink, Router, RouterService,
};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::Service;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

// Entries kept for the admin dashboard.
const REQUEST_LOG_CAPACITY: usize = 500;

#[derive(Parser)]
#[command(name = "deadlight")]
#[command(about = "Serves the deadlight blog and webmail routes", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

async fn home(_: Request<Full<Bytes>>, env: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
    let body = format!("deadlight ({})", env.environment());
    Ok(Response::new(Full::new(Bytes::from(body))))
}

async fn health(_: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
    let mut res = Response::new(Full::new(Bytes::from_static(br#"{"status":"ok"}"#)));
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(res)
}

// Recent request log entries, newest first.
async fn dashboard(req: Request<Full<Bytes>>, env: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
    let user = req
        .current_user()
        .map(|u| u.username.clone())
        .unwrap_or_default();

    let entries = env
        .data::<Arc<MemoryLogSink>>()
        .map(|sink| sink.entries())
        .unwrap_or_default();

    let recent: Vec<_> = entries.iter().rev().take(50).collect();
    let body = serde_json::json!({ "admin": user, "requests": recent });

    let mut res = Response::new(Full::new(Bytes::from(body.to_string())));
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(res)
}

fn router() -> deadlight_router::Result<Router> {
    Router::builder()
        .middleware(error_handler())
        .middleware(request_logger())
        .get("/", home)
        .get("/health", health)
        .get("/admin", admin_only(dashboard))
        .build()
}

fn load_config(cli: &Cli) -> deadlight_router::Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    }
    .apply_env_overrides()?;

    if let Some(ref bind) = cli.bind {
        config.server.bind_address = bind.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Resolves on Ctrl-C, or on SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "couldn't listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "couldn't listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    telemetry::init(&config.log);

    let addr = config.bind_address()?;
    let environment = config.environment;

    let sink = Arc::new(MemoryLogSink::with_capacity(REQUEST_LOG_CAPACITY));
    let env = Env::builder(config)
        .request_log(sink.clone())
        .data(sink)
        .build();

    let service = Arc::new(RouterService::new(router()?, env));
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, environment = %environment, "deadlight is listening");

    // Flips to `true` once the server stops accepting; open connections finish their
    // in-flight request and close.
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!(in_flight = connections.len(), "shutting down, draining connections");
                break;
            }

            accepted = listener.accept() => {
                let (stream, _) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        error!(error = %err, "couldn't accept connection");
                        continue;
                    }
                };

                let service = service.clone();
                let mut stop_rx = stop_rx.clone();
                connections.spawn(async move {
                    let request_service = match service.call(&stream).await {
                        Ok(svc) => svc,
                        Err(never) => match never {},
                    };
                    let io = TokioIo::new(stream);

                    let builder = Builder::new(TokioExecutor::new());
                    let conn = builder.serve_connection(io, request_service);
                    tokio::pin!(conn);

                    let result = tokio::select! {
                        res = conn.as_mut() => res,
                        _ = stop_rx.changed() => {
                            conn.as_mut().graceful_shutdown();
                            conn.await
                        }
                    };

                    if let Err(err) = result {
                        error!(error = %err, "error serving connection");
                    }
                });
            }

            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    let _ = stop_tx.send(true);
    while connections.join_next().await.is_some() {}
    info!("deadlight stopped");

    Ok(())
}

//! Session based authentication.
//!
//! A session lives in the KV binding under `session:<id>` as JSON and is referenced by the
//! `session` cookie. Handlers are protected by wrapping them with [`protected`] or
//! [`admin_only`]; whole path prefixes by registering [`require_session`].

use super::{Middleware, Next};
use crate::constants::{SESSION_COOKIE, SESSION_KEY_PREFIX};
use crate::env::Env;
use crate::helpers;
use crate::Error;
use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::COOKIE;
use hyper::{Request, Response};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// The stored session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    pub expires: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires < now
    }
}

/// The authenticated user, inserted into the request extensions by the auth wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<Session> for CurrentUser {
    fn from(session: Session) -> Self {
        CurrentUser {
            user_id: session.user_id,
            username: session.username,
            is_admin: session.is_admin,
        }
    }
}

fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, session_id)
}

/// Stores a new session for `user` valid for `ttl` and returns the session id to set as
/// the `session` cookie.
pub async fn create_session(env: &Env, user: &CurrentUser, ttl: Duration) -> crate::Result<String> {
    let session_id = Uuid::new_v4().simple().to_string();
    let session = Session {
        user_id: user.user_id,
        username: user.username.clone(),
        is_admin: user.is_admin,
        expires: Utc::now() + ttl,
    };

    env.kv()
        .put(session_key(&session_id).as_str(), serde_json::to_string(&session)?)
        .await?;

    Ok(session_id)
}

/// Resolves the user behind the request's session cookie.
///
/// Returns `None` when there is no cookie, no stored session, or the stored record can't be
/// read. An expired session is deleted from the store.
pub async fn current_user<T>(req: &Request<T>, env: &Env) -> crate::Result<Option<CurrentUser>> {
    let session_id = match req
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| helpers::cookie_value(cookies, SESSION_COOKIE))
    {
        Some(id) => id.to_owned(),
        None => return Ok(None),
    };

    let key = session_key(&session_id);
    let raw = match env.kv().get(key.as_str()).await? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let session: Session = match serde_json::from_str(raw.as_str()) {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "discarding unreadable session record");
            return Ok(None);
        }
    };

    if session.is_expired_at(Utc::now()) {
        debug!(user_id = session.user_id, "session expired");
        env.kv().delete(key.as_str()).await?;
        return Ok(None);
    }

    Ok(Some(session.into()))
}

async fn authenticate(mut req: Request<Full<Bytes>>, env: &Env, admin: bool) -> crate::Result<Request<Full<Bytes>>> {
    let user = current_user(&req, env)
        .await?
        .ok_or_else(|| Error::unauthorized("no valid session"))?;

    if admin && !user.is_admin {
        return Err(Error::unauthorized(format!("user {} is not an admin", user.username)));
    }

    req.extensions_mut().insert(user);
    Ok(req)
}

/// Wraps a route handler so it only runs for a signed-in user.
///
/// # Examples
///
/// ```
/// use deadlight_router::prelude::*;
/// use deadlight_router::{protected, Env, Router};
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
///
/// async fn inbox(req: Request<Full<Bytes>>, _: Env) -> deadlight_router::Result<Response<Full<Bytes>>> {
///     let user = req.current_user().unwrap();
///     Ok(Response::new(Full::new(Bytes::from(format!("Inbox of {}", user.username)))))
/// }
///
/// let router = Router::builder().get("/inbox", protected(inbox)).build().unwrap();
/// # let _ = router;
/// ```
pub fn protected<H, R>(
    handler: H,
) -> impl Fn(Request<Full<Bytes>>, Env) -> BoxFuture<'static, crate::Result<Response<Full<Bytes>>>> + Send + Sync + 'static
where
    H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
    R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
{
    guard(handler, false)
}

/// Like [`protected`], and additionally requires the user to be an admin.
pub fn admin_only<H, R>(
    handler: H,
) -> impl Fn(Request<Full<Bytes>>, Env) -> BoxFuture<'static, crate::Result<Response<Full<Bytes>>>> + Send + Sync + 'static
where
    H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
    R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
{
    guard(handler, true)
}

fn guard<H, R>(
    handler: H,
    admin: bool,
) -> impl Fn(Request<Full<Bytes>>, Env) -> BoxFuture<'static, crate::Result<Response<Full<Bytes>>>> + Send + Sync + 'static
where
    H: Fn(Request<Full<Bytes>>, Env) -> R + Send + Sync + 'static,
    R: Future<Output = crate::Result<Response<Full<Bytes>>>> + Send + 'static,
{
    let handler = Arc::new(handler);
    move |req: Request<Full<Bytes>>, env: Env| {
        let handler = handler.clone();
        Box::pin(async move {
            let req = authenticate(req, &env, admin).await?;
            handler(req, env).await
        }) as BoxFuture<'static, _>
    }
}

/// Creates a middleware that requires a session for every path starting with `prefix`.
///
/// Other paths pass through untouched.
pub fn require_session<P: Into<String>>(prefix: P) -> Middleware {
    let prefix: Arc<str> = Arc::from(prefix.into());

    Middleware::new(move |req: Request<Full<Bytes>>, env: Env, next: Next| {
        let prefix = prefix.clone();
        async move {
            if !req.uri().path().starts_with(prefix.as_ref()) {
                return next.run(req).await;
            }

            let req = authenticate(req, &env, false).await?;
            next.run(req).await
        }
    })
}

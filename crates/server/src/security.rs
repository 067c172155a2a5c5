// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSRF protection and per-client rate limiting.
//!
//! CSRF uses the synchronizer-token pattern: a cookie-authenticated request
//! that changes state must echo its session's CSRF token in the
//! `X-CSRF-Token` header. Bearer-token clients are exempt because browsers
//! never attach that header on their own.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;

use axum::{
    extract::{ConnectInfo, Request, State as AxumState},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use marquee_api::ApiError;
use marquee_persistence::SessionData;
use subtle::ConstantTimeEq;
use tracing::{debug, trace, warn};

use crate::AppState;
use crate::error::HttpError;
use crate::session::{AuthMethod, session_token};

/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Endpoints reachable before a session exists.
const CSRF_EXEMPT_PATHS: [&str; 3] = [
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/bootstrap",
];

/// Endpoints limited by the stricter credential bucket.
const CREDENTIAL_PATHS: [&str; 4] = [
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/bootstrap",
    "/api/auth/password",
];

const fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Rejects cookie-authenticated mutations without a matching CSRF token.
///
/// Requests whose cookie names no live session pass through; the session
/// extractor turns those away with 401.
pub async fn csrf_guard(
    AxumState(app_state): AxumState<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe_method(request.method()) {
        trace!("CSRF skipped: safe method {}", request.method());
        return next.run(request).await;
    }
    if CSRF_EXEMPT_PATHS.contains(&request.uri().path()) {
        trace!("CSRF skipped: auth endpoint {}", request.uri().path());
        return next.run(request).await;
    }

    let token: String = match session_token(request.headers()) {
        Ok(Some((token, AuthMethod::Cookie))) => token,
        Ok(Some((_, AuthMethod::Bearer))) => {
            trace!("CSRF skipped: Bearer token authentication");
            return next.run(request).await;
        }
        Ok(None) | Err(_) => return next.run(request).await,
    };

    let session: Option<SessionData> = {
        let mut persistence = app_state.persistence.lock().await;
        match persistence.get_session_by_token(&token) {
            Ok(session) => session,
            Err(e) => return HttpError::from(ApiError::from(e)).into_response(),
        }
    };
    let Some(session) = session else {
        return next.run(request).await;
    };

    let token_matches: Option<bool> = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|sent| constant_time_compare(sent, &session.csrf_token));
    match token_matches {
        Some(true) => {
            trace!("CSRF validation passed");
            next.run(request).await
        }
        Some(false) => {
            warn!(user_id = session.user_id, "CSRF token mismatch");
            csrf_rejection()
        }
        None => {
            warn!(user_id = session.user_id, "X-CSRF-Token header not found");
            csrf_rejection()
        }
    }
}

fn csrf_rejection() -> Response {
    HttpError::new(
        StatusCode::FORBIDDEN,
        String::from("CSRF token missing or invalid"),
    )
    .into_response()
}

/// Per-IP token buckets for the JSON API.
pub struct RateLimits {
    api: DefaultKeyedRateLimiter<IpAddr>,
    credentials: DefaultKeyedRateLimiter<IpAddr>,
}

impl RateLimits {
    /// Builds the buckets from per-minute allowances.
    ///
    /// # Errors
    ///
    /// Returns an error if either allowance is zero.
    pub fn new(api_per_minute: u32, credentials_per_minute: u32) -> Result<Self, String> {
        let api: NonZeroU32 = NonZeroU32::new(api_per_minute)
            .ok_or_else(|| String::from("API rate limit must be at least 1 per minute"))?;
        let credentials: NonZeroU32 = NonZeroU32::new(credentials_per_minute)
            .ok_or_else(|| String::from("Auth rate limit must be at least 1 per minute"))?;

        Ok(Self {
            api: RateLimiter::keyed(Quota::per_minute(api)),
            credentials: RateLimiter::keyed(Quota::per_minute(credentials)),
        })
    }

    fn allows(&self, ip: IpAddr, credential_request: bool) -> bool {
        if self.api.check_key(&ip).is_err() {
            return false;
        }
        !credential_request || self.credentials.check_key(&ip).is_ok()
    }

    /// Drops buckets for clients that have gone quiet.
    pub fn retain_recent(&self) {
        self.api.retain_recent();
        self.credentials.retain_recent();
    }
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |ConnectInfo(addr)| {
            addr.ip()
        })
}

/// Answers 429 once a client exhausts its bucket.
pub async fn rate_limit(
    AxumState(app_state): AxumState<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path: String = request.uri().path().to_string();
    if !path.starts_with("/api/") {
        return next.run(request).await;
    }

    let credential_request: bool =
        request.method() == Method::POST && CREDENTIAL_PATHS.contains(&path.as_str());
    let ip: IpAddr = client_ip(&request);
    if app_state.rate_limits.allows(ip, credential_request) {
        next.run(request).await
    } else {
        debug!(%ip, path = %path, "Rate limit exceeded");
        HttpError::new(
            StatusCode::TOO_MANY_REQUESTS,
            String::from("Too many requests, slow down"),
        )
        .into_response()
    }
}

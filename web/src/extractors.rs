//! Custom Axum extractors.
//!
//! This module contains custom extractors for common HTTP patterns:
//! - `Identity`: Extract the verified caller identity from trusted headers
//! - `ClientIp`: Extract client IP address from headers or connection
//!
//! # Identity headers
//!
//! The portal terminates authentication at the gateway; by the time a
//! request reaches this service the gateway has verified the session and
//! stamped `X-User-Id` and `X-User-Role` onto it. This service trusts
//! those headers and only decides authorization.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use janseva_core::types::{Role, UserId};
use janseva_runtime::RequestContext;
use std::net::IpAddr;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the authenticated user's role claim.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// The verified caller: who they are and what role they hold.
///
/// Rejects with 401 when either identity header is missing or
/// malformed.
///
/// # Example
///
/// ```ignore
/// async fn handler(identity: Identity) -> String {
///     format!("Hello, {}", identity.actor)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// The authenticated user.
    pub actor: UserId,
    /// The user's role claim.
    pub role: Role,
}

impl Identity {
    /// Builds the request context the lifecycle controller expects.
    #[must_use]
    pub const fn context(self, ip: IpAddr) -> RequestContext {
        RequestContext {
            actor: self.actor,
            role: self.role,
            ip: Some(ip),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = header_str(&parts.headers, USER_ID_HEADER)
            .and_then(|s| s.parse::<UserId>().ok())
            .ok_or_else(|| {
                AppError::unauthorized(format!("missing or malformed {USER_ID_HEADER} header"))
            })?;
        let role = header_str(&parts.headers, USER_ROLE_HEADER)
            .and_then(|s| s.parse::<Role>().ok())
            .ok_or_else(|| {
                AppError::unauthorized(format!("missing or malformed {USER_ROLE_HEADER} header"))
            })?;

        Ok(Self { actor, role })
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Client IP address.
///
/// Extracts the client IP from the `X-Forwarded-For` header (first IP),
/// or falls back to `X-Real-IP`, or localhost.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Localhost fallback
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_client_ip(&parts.headers)))
    }
}

fn extract_client_ip(headers: &HeaderMap) -> IpAddr {
    if let Some(forwarded) = header_str(headers, "X-Forwarded-For") {
        if let Some(first_ip) = forwarded.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return ip;
            }
        }
    }

    if let Some(real_ip) = header_str(headers, "X-Real-IP") {
        if let Ok(ip) = real_ip.parse::<IpAddr>() {
            return ip;
        }
    }

    IpAddr::from([127, 0, 0, 1])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_of(req: Request<()>) -> Parts {
        let (parts, ()) = req.into_parts();
        parts
    }

    #[tokio::test]
    async fn identity_from_headers() {
        let user = UserId::new();
        let mut parts = parts_of(
            Request::builder()
                .header(USER_ID_HEADER, user.to_string())
                .header(USER_ROLE_HEADER, "officer")
                .body(())
                .unwrap(),
        );

        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.actor, user);
        assert_eq!(identity.role, Role::Officer);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let mut parts = parts_of(Request::builder().body(()).unwrap());
        let err = Identity::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_role_is_unauthorized() {
        let mut parts = parts_of(
            Request::builder()
                .header(USER_ID_HEADER, UserId::new().to_string())
                .header(USER_ROLE_HEADER, "supreme-leader")
                .body(())
                .unwrap(),
        );
        let err = Identity::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn client_ip_from_x_forwarded_for() {
        let mut parts = parts_of(
            Request::builder()
                .header("X-Forwarded-For", "203.0.113.1, 198.51.100.1")
                .body(())
                .unwrap(),
        );
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client_ip.0.to_string(), "203.0.113.1");
    }

    #[tokio::test]
    async fn client_ip_from_x_real_ip() {
        let mut parts = parts_of(
            Request::builder()
                .header("X-Real-IP", "198.51.100.42")
                .body(())
                .unwrap(),
        );
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client_ip.0.to_string(), "198.51.100.42");
    }

    #[tokio::test]
    async fn client_ip_fallback() {
        let mut parts = parts_of(Request::builder().body(()).unwrap());
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client_ip.0.to_string(), "127.0.0.1");
    }
}

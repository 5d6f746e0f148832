//! Request extractors for caller identity and peer address.

use super::errors::ApiError;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use std::net::{IpAddr, SocketAddr};

const USER_COOKIE: &str = "user";

/// Opaque caller identity, compared for equality with record creators.
///
/// Taken from the `Authorization` header, with an optional `Bearer`
/// prefix, or else from the `user` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    /// Returns the identity.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_identity(parts)
            .or_else(|| cookie_identity(parts))
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("missing caller identity"))
    }
}

fn header_identity(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let identity = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!identity.is_empty()).then(|| identity.to_owned())
}

fn cookie_identity(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == USER_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// Peer address of the connection, when the server was started with
/// connect info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedAddr(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ObservedAddr
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip()),
        ))
    }
}

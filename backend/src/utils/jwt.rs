//! Compact HS256 bearer tokens.
//!
//! `verify` only checks structure and signature. Expiry, audience and
//! issuer are enforced by `AuthService::check_jwt`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey, Header};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};

/// Expiry applied when the caller leaves `exp` unset.
pub const DEFAULT_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(value) => value == audience,
            Audience::Many(values) => values.iter().any(|v| v == audience),
        }
    }
}

/// Reserved claims plus an open map for anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJwt {
    pub header: JwtHeader,
    pub payload: JwtPayload,
    pub signature: String,
}

pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

pub fn sign(mut payload: JwtPayload, secret: &[u8]) -> ServiceResult<String> {
    let now = now_secs();
    payload.iat.get_or_insert(now);
    payload.exp.get_or_insert(now + DEFAULT_TTL_SECS);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to encode token");
        ServiceError::InvalidToken("token could not be encoded")
    })
}

/// Checks the HMAC over `header.payload`. A token without exactly three
/// segments is an error; every other mismatch yields `false`.
pub fn verify(token: &str, secret: &[u8]) -> ServiceResult<bool> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ServiceError::InvalidToken("token must have three segments"));
    }
    let message = &token[..parts[0].len() + 1 + parts[1].len()];

    Ok(crypto::verify(
        parts[2],
        message.as_bytes(),
        &DecodingKey::from_secret(secret),
        Algorithm::HS256,
    )
    .unwrap_or(false))
}

/// Decodes without checking the signature.
pub fn decode(token: &str) -> ServiceResult<DecodedJwt> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ServiceError::InvalidToken("token must have three segments"));
    };

    Ok(DecodedJwt {
        header: decode_segment(header, "malformed header")?,
        payload: decode_segment(payload, "malformed payload")?,
        signature: signature.to_string(),
    })
}

fn decode_segment<T: DeserializeOwned>(segment: &str, reason: &'static str) -> ServiceResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| ServiceError::InvalidToken(reason))?;
    serde_json::from_slice(&bytes).map_err(|_| ServiceError::InvalidToken(reason))
}

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            other => Err(format!("unsupported SameSite value `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

/// Display-only cookie holding the logged in user name. Readable by scripts.
pub const IDENTITY_COOKIE_NAME: &str = "warden_user";
pub const COOKIE_PATH: &str = "/";

pub fn build_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    http_only: bool,
    options: CookieOptions,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}",
        name,
        value,
        COOKIE_PATH,
        max_age.as_secs()
    );
    append_attributes(&mut cookie, http_only, options);
    cookie
}

pub fn build_clear_cookie(name: &str, http_only: bool, options: CookieOptions) -> String {
    let mut cookie = format!("{}=; Path={}; Max-Age=0", name, COOKIE_PATH);
    append_attributes(&mut cookie, http_only, options);
    cookie
}

fn append_attributes(cookie: &mut String, http_only: bool, options: CookieOptions) {
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(same_site_value(options.same_site));
    if options.secure {
        cookie.push_str("; Secure");
    }
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// `<sid>.<base64url(HMAC-SHA256(sid))>`
pub fn sign_session_id(sid: &str, secret: &[u8]) -> Option<String> {
    let signature =
        crypto::sign(sid.as_bytes(), &EncodingKey::from_secret(secret), Algorithm::HS256).ok()?;
    Some(format!("{}.{}", sid, signature))
}

/// Returns the session id when the signature matches.
pub fn unsign_session_cookie(value: &str, secret: &[u8]) -> Option<String> {
    let (sid, signature) = value.rsplit_once('.')?;
    if sid.is_empty() {
        return None;
    }
    let valid = crypto::verify(
        signature,
        sid.as_bytes(),
        &DecodingKey::from_secret(secret),
        Algorithm::HS256,
    )
    .unwrap_or(false);
    valid.then(|| sid.to_string())
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}

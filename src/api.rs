//! Helpers shared by everything which talks to the backend.

use crate::{session::Session, storage::Storage};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::fmt::{self, Display, Formatter};
use url::Url;

/// Somebody asked for credentials while nobody was logged in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Not logged in")]
pub struct Unauthenticated;

/// Get the current bearer token. An empty token is no token at all.
pub fn require_token<S: Storage>(
    session: &Session<S>,
) -> Result<&str, Unauthenticated> {
    session
        .auth_token()
        .filter(|token| !token.is_empty())
        .ok_or(Unauthenticated)
}

/// Headers which authenticate a request as the logged in user.
pub fn auth_headers<S: Storage>(
    session: &Session<S>,
) -> Result<HeaderMap, Unauthenticated> {
    let token = require_token(session)?;

    // a token containing newlines or other control characters can't be sent
    // anyway, so we treat it the same as not having one
    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Unauthenticated)?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Headers for a request with a JSON body.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Where the backend lives, e.g. `https://shop.example.com`.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Parse a base URL, dropping any trailing slashes.
    ///
    /// An empty string is allowed and means "the same origin", so every
    /// request URL is just the endpoint's path.
    pub fn parse(raw: &str) -> Result<BaseUrl, url::ParseError> {
        let trimmed = raw.trim().trim_end_matches('/');

        if !trimmed.is_empty() {
            Url::parse(trimmed)?;
        }

        Ok(BaseUrl(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// The full URL for `path`, which should start with a `/`.
    pub fn join(&self, path: &str) -> String { format!("{}{}", self.0, path) }

    /// Turn the image path attached to a listing into something that can be
    /// fetched.
    ///
    /// Absolute URLs are returned unchanged and anything else is resolved
    /// relative to the backend.
    pub fn image_url(&self, image_path: Option<&str>) -> Option<String> {
        let path = image_path.unwrap_or_default().trim();

        if path.is_empty() {
            None
        } else if path.starts_with("http://") || path.starts_with("https://") {
            Some(path.to_string())
        } else if path.starts_with('/') {
            Some(self.join(path))
        } else {
            Some(format!("{}/{}", self.0, path))
        }
    }
}

impl Display for BaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

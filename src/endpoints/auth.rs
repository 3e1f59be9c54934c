use crate::api::{json_headers, BaseUrl};
use reqwest::{Client, Error as ReqwestError, Method};
use serde_derive::{Deserialize, Serialize};

/// Exchange an email and password for a bearer token.
///
/// The token isn't stored anywhere, pass it to
/// [`crate::Session::login()`] if you want to keep it.
pub async fn login(
    client: &Client,
    base_url: &BaseUrl,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    authenticate(client, base_url, "/api/login", email, password, "Login failed")
        .await
}

/// Create a new account, getting back a bearer token for it.
pub async fn register(
    client: &Client,
    base_url: &BaseUrl,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    authenticate(
        client,
        base_url,
        "/api/register",
        email,
        password,
        "Registration failed",
    )
    .await
}

async fn authenticate(
    client: &Client,
    base_url: &BaseUrl,
    path: &str,
    email: &str,
    password: &str,
    fallback: &str,
) -> Result<String, AuthError> {
    let data = Credentials { email, password };
    let response =
        super::request(client, Method::POST, base_url, path, &[&json_headers()])
            .json(&data)
            .send()
            .await?;

    log::trace!("Response Headers: {:#?}", response.headers());
    let ok = response.status().is_success();

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    interpret_response(ok, &body, fallback)
}

fn interpret_response(
    ok: bool,
    body: &str,
    fallback: &str,
) -> Result<String, AuthError> {
    let response: AuthResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        // error pages don't always come back as JSON
        Err(_) if !ok => AuthResponse::default(),
        Err(e) => return Err(AuthError::ResponseParse(e)),
    };

    match response {
        AuthResponse {
            success: true,
            token: Some(token),
            ..
        } if ok => Ok(token),
        AuthResponse { success: true, .. } if ok => Err(AuthError::MissingToken),
        AuthResponse { message, .. } => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            log::warn!("Authentication was rejected: {}", message);

            Err(AuthError::RejectedByServer { message })
        },
    }
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Possible errors that may be returned by [`login()`] and [`register()`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] ReqwestError),
    /// Unable to parse the response.
    #[error("Unable to parse the response")]
    ResponseParse(#[from] serde_json::Error),
    /// The backend said everything went fine, but didn't send a token.
    #[error("The server didn't send back a token")]
    MissingToken,
    /// The backend rejected the credentials, with its reason (or a generic
    /// message if it didn't give one).
    #[error("{}", message)]
    RejectedByServer { message: String },
}

//! The marketplace backend's endpoints.
//!
//! Every function sends exactly one request. Endpoints which need the user
//! to be logged in take the headers created by [`crate::api::auth_headers()`],
//! so a missing token is caught before anything touches the network.

mod ads;
mod auth;
mod notifications;
mod profile;
mod purchases;

pub use ads::{
    create_ad, delete_ad, delete_ad_image, list_ads, update_ad,
    upload_ad_image,
};
pub use auth::{login, register, AuthError};
pub use notifications::{
    mark_notification_read, unread_notifications, Notification,
};
pub use profile::{profile, Profile};
pub use purchases::checkout;

use crate::{
    ads::InvalidAd,
    api::{BaseUrl, Unauthenticated},
};
use reqwest::{
    header::HeaderMap, Client, Method, RequestBuilder, Response, StatusCode,
};

/// Typical endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] reqwest::Error),
    /// Unable to parse the JSON in the response.
    #[error("Unable to parse the response")]
    ResponseParse(#[from] serde_json::Error),
    /// The backend refused to do what we asked.
    #[error("{}", message)]
    Rejected { status: StatusCode, message: String },
    /// The listing was rejected before sending anything.
    #[error("Invalid listing")]
    InvalidAd(#[from] InvalidAd),
    #[error("Not logged in")]
    Unauthenticated(#[from] Unauthenticated),
}

fn request(
    client: &Client,
    method: Method,
    base_url: &BaseUrl,
    path: &str,
    headers: &[&HeaderMap],
) -> RequestBuilder {
    let url = base_url.join(path);
    log::debug!("Sending a {} request to {}", method, url);

    headers
        .iter()
        .fold(client.request(method, &url), |builder, headers| {
            builder.headers((*headers).clone())
        })
}

/// Turn an unsuccessful response into [`EndpointError::Rejected`], using the
/// response body as the message when the backend gave us one.
async fn expect_success(
    response: Response,
    fallback: &str,
) -> Result<Response, EndpointError> {
    log::trace!("Response Headers: {:#?}", response.headers());
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::debug!("The request failed with {}: {}", status, body);

    Err(EndpointError::Rejected {
        status,
        message: rejection_message(&body, fallback),
    })
}

fn rejection_message(body: &str, fallback: &str) -> String {
    let body = body.trim();

    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_the_body_as_the_rejection_message() {
        let got = rejection_message("Ad already sold\n", "Purchase failed.");

        assert_eq!(got, "Ad already sold");
    }

    #[test]
    fn fall_back_when_the_body_is_empty() {
        let got = rejection_message("  ", "Purchase failed.");

        assert_eq!(got, "Purchase failed.");
    }

    #[test]
    fn rejections_display_their_message() {
        let err = EndpointError::Rejected {
            status: StatusCode::CONFLICT,
            message: String::from("Saving failed."),
        };

        assert_eq!(err.to_string(), "Saving failed.");
    }
}

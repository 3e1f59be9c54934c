use crate::api::BaseUrl;
use reqwest::{header::HeaderMap, Client, Error as ReqwestError, Method};
use serde_derive::{Deserialize, Serialize};

/// Something the backend wants to tell the user (e.g. "your listing sold").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
}

/// Get the user's unread notifications.
///
/// Notifications are best-effort, so a failed request or an unexpected body
/// just means there's nothing to show. Only transport errors are reported.
pub async fn unread_notifications(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
) -> Result<Vec<Notification>, ReqwestError> {
    let response = super::request(
        client,
        Method::GET,
        base_url,
        "/api/notifications",
        &[auth],
    )
    .send()
    .await?;

    if !response.status().is_success() {
        log::debug!(
            "Fetching notifications failed with {}, assuming there are none",
            response.status()
        );
        return Ok(Vec::new());
    }

    let body = response.text().await?;
    log::trace!("Response Body: {}", body);

    Ok(parse_notifications(&body))
}

fn parse_notifications(body: &str) -> Vec<Notification> {
    match serde_json::from_str(body) {
        Ok(notifications) => notifications,
        Err(e) => {
            log::warn!("Ignoring an unexpected notifications response: {}", e);
            Vec::new()
        },
    }
}

/// Tell the backend the user has seen a notification. The response status
/// is ignored.
pub async fn mark_notification_read(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    id: i64,
) -> Result<(), ReqwestError> {
    let path = format!("/api/notifications/{}/read", id);
    let response =
        super::request(client, Method::POST, base_url, &path, &[auth])
            .send()
            .await?;

    log::debug!("Marked notification {} as read ({})", id, response.status());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_some_notifications() {
        let src = r#"[{"id": 1, "message": "A"}, {"id": 2, "message": "B"}]"#;
        let should_be = vec![
            Notification {
                id: 1,
                message: String::from("A"),
            },
            Notification {
                id: 2,
                message: String::from("B"),
            },
        ];

        let got = parse_notifications(src);

        assert_eq!(got, should_be);
    }

    #[test]
    fn anything_other_than_a_list_is_ignored() {
        assert!(parse_notifications(r#"{"id": 1, "message": "A"}"#).is_empty());
        assert!(parse_notifications("null").is_empty());
        assert!(parse_notifications("").is_empty());
    }
}

use super::EndpointError;
use crate::{
    ads::{Ad, AdPayload},
    api::{json_headers, BaseUrl},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    multipart::{Form, Part},
    Client, Method,
};
use serde_derive::Deserialize;
use serde_json::Value;

/// Fetch every listing on the marketplace. This doesn't need a login.
pub async fn list_ads(
    client: &Client,
    base_url: &BaseUrl,
) -> Result<Vec<Ad>, EndpointError> {
    let mut accept = HeaderMap::new();
    accept.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let response =
        super::request(client, Method::GET, base_url, "/api/ads", &[&accept])
            .send()
            .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(EndpointError::Rejected {
            status,
            message: format!(
                "Unable to load ads (status {}).",
                status.as_u16()
            ),
        });
    }

    let body = response.text().await?;
    log::trace!("Response Body: {}", body);

    parse_ads(&body).map_err(EndpointError::from)
}

/// The backend sometimes sends a lone object (or nothing at all) instead of
/// a list.
fn parse_ads(body: &str) -> Result<Vec<Ad>, serde_json::Error> {
    match serde_json::from_str(body)? {
        Value::Null => Ok(Vec::new()),
        list @ Value::Array(_) => serde_json::from_value(list),
        single => serde_json::from_value(single).map(|ad| vec![ad]),
    }
}

/// Create a new listing, returning its ID.
pub async fn create_ad(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    payload: &AdPayload,
) -> Result<i64, EndpointError> {
    payload.validate()?;
    log::trace!("Payload: {:#?}", payload);

    let response = super::request(
        client,
        Method::POST,
        base_url,
        "/api/ads",
        &[&json_headers(), auth],
    )
    .json(payload)
    .send()
    .await?;

    let body = super::expect_success(response, "Saving failed.")
        .await?
        .text()
        .await?;
    log::trace!("Response Body: {}", body);

    let created: Created = serde_json::from_str(&body)?;
    log::info!("Created listing {}", created.id);

    Ok(created.id)
}

#[derive(Debug, Deserialize)]
struct Created {
    id: i64,
}

/// Replace the details of an existing listing.
pub async fn update_ad(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    ad_id: i64,
    payload: &AdPayload,
) -> Result<(), EndpointError> {
    payload.validate()?;
    log::trace!("Payload: {:#?}", payload);

    let path = format!("/api/ads/{}", ad_id);
    let response = super::request(
        client,
        Method::PUT,
        base_url,
        &path,
        &[&json_headers(), auth],
    )
    .json(payload)
    .send()
    .await?;

    super::expect_success(response, "Saving failed.").await?;
    Ok(())
}

pub async fn delete_ad(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    ad_id: i64,
) -> Result<(), EndpointError> {
    let path = format!("/api/ads/{}", ad_id);
    let response =
        super::request(client, Method::DELETE, base_url, &path, &[auth])
            .send()
            .await?;

    super::expect_success(response, "Deleting failed.").await?;
    Ok(())
}

/// Attach an image to a listing, sent as the multipart field `file`.
pub async fn upload_ad_image(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    ad_id: i64,
    file_name: &str,
    contents: Vec<u8>,
) -> Result<(), EndpointError> {
    log::debug!(
        "Uploading \"{}\" ({} bytes) for listing {}",
        file_name,
        contents.len(),
        ad_id
    );

    let form = Form::new()
        .part("file", Part::bytes(contents).file_name(file_name.to_string()));
    let path = format!("/api/ads/{}/image", ad_id);
    let response =
        super::request(client, Method::POST, base_url, &path, &[auth])
            .multipart(form)
            .send()
            .await?;

    super::expect_success(response, "Image upload failed.").await?;
    Ok(())
}

pub async fn delete_ad_image(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    ad_id: i64,
) -> Result<(), EndpointError> {
    let path = format!("/api/ads/{}/image", ad_id);
    let response =
        super::request(client, Method::DELETE, base_url, &path, &[auth])
            .send()
            .await?;

    super::expect_success(response, "Deleting the image failed.").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_list_of_ads() {
        let src = r#"[
            {"id": 1, "brand": "Mine", "size": "42", "price": "10", "ownerEmail": "me@example.com", "imagePath": null, "sold": false},
            {"id": 2, "brand": "Other", "size": "43", "price": "20", "ownerEmail": "other@example.com", "imagePath": null, "sold": false}
        ]"#;

        let got = parse_ads(src).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got[1].brand, "Other");
        assert_eq!(got[1].owner_email, "other@example.com");
    }

    #[test]
    fn a_single_ad_becomes_a_list() {
        let src = r#"{"id": 7, "brand": "Solo", "size": "44", "price": "5", "ownerEmail": "a@b.de"}"#;

        let got = parse_ads(src).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, 7);
    }

    #[test]
    fn null_is_an_empty_list() {
        assert!(parse_ads("null").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_ads("[{\"id\": \"nope\"}]").is_err());
    }
}

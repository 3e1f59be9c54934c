use super::EndpointError;
use crate::api::{json_headers, BaseUrl};
use reqwest::{header::HeaderMap, Client, Method};
use serde_derive::Serialize;

/// Buy every listing in `ad_ids`.
pub async fn checkout(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
    ad_ids: &[i64],
) -> Result<(), EndpointError> {
    let data = Data { ad_ids };
    log::trace!("Payload: {:#?}", data);

    let response = super::request(
        client,
        Method::POST,
        base_url,
        "/api/purchases/checkout",
        &[&json_headers(), auth],
    )
    .json(&data)
    .send()
    .await?;

    super::expect_success(response, "Purchase failed.").await?;
    log::info!("Bought {} items", ad_ids.len());

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Data<'a> {
    ad_ids: &'a [i64],
}

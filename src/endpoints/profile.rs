use super::EndpointError;
use crate::{
    ads::{text_or_number, Ad},
    api::BaseUrl,
};
use reqwest::{header::HeaderMap, Client, Method};
use serde_derive::{Deserialize, Serialize};

/// A summary of the user's activity on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub total_ads: u64,
    #[serde(default)]
    pub sold_count: u64,
    /// How much the user has earned, as the backend formatted it.
    #[serde(default = "zero", deserialize_with = "text_or_number")]
    pub revenue_total: String,
    #[serde(default)]
    pub bought_count: u64,
    #[serde(default = "zero", deserialize_with = "text_or_number")]
    pub spent_total: String,
    #[serde(default)]
    pub sold_ads: Vec<Ad>,
    #[serde(default)]
    pub bought_ads: Vec<Ad>,
}

fn zero() -> String { String::from("0") }

/// Load the logged in user's [`Profile`].
pub async fn profile(
    client: &Client,
    base_url: &BaseUrl,
    auth: &HeaderMap,
) -> Result<Profile, EndpointError> {
    let response =
        super::request(client, Method::GET, base_url, "/api/profile", &[auth])
            .send()
            .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(EndpointError::Rejected {
            status,
            message: String::from("Unable to load the profile"),
        });
    }

    let body = response.text().await?;
    log::trace!("Response Body: {}", body);

    serde_json::from_str(&body).map_err(EndpointError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_profile() {
        let src = r#"{
            "email": "me@example.com",
            "totalAds": 3,
            "soldCount": 1,
            "revenueTotal": 10,
            "boughtCount": 2,
            "spentTotal": "25.5",
            "soldAds": [],
            "boughtAds": []
        }"#;
        let should_be = Profile {
            email: String::from("me@example.com"),
            total_ads: 3,
            sold_count: 1,
            revenue_total: String::from("10"),
            bought_count: 2,
            spent_total: String::from("25.5"),
            sold_ads: Vec::new(),
            bought_ads: Vec::new(),
        };

        let got: Profile = serde_json::from_str(src).unwrap();

        assert_eq!(got, should_be);
    }

    #[test]
    fn missing_totals_default_to_zero() {
        let got: Profile =
            serde_json::from_str(r#"{"email": "new@example.com"}"#).unwrap();

        assert_eq!(got.revenue_total, "0");
        assert_eq!(got.spent_total, "0");
        assert!(got.bought_ads.is_empty());
    }

    #[test]
    fn null_totals_are_zero() {
        let src = r#"{"email": "a@b.de", "revenueTotal": null, "spentTotal": null}"#;

        let got: Profile = serde_json::from_str(src).unwrap();

        assert_eq!(got.revenue_total, "0");
        assert_eq!(got.spent_total, "0");
    }
}

//! Marketplace listings.

use serde::{de, Deserializer};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// A single listing, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: i64,
    pub brand: String,
    pub size: String,
    #[serde(deserialize_with = "text_or_number")]
    pub price: String,
    pub owner_email: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub sold: Option<bool>,
    #[serde(default)]
    pub buyer_email: Option<String>,
}

impl Ad {
    pub fn is_sold(&self) -> bool { self.sold.unwrap_or(false) }

    /// Was this listing created by `email`?
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner_email.eq_ignore_ascii_case(email)
    }
}

/// The fields a user fills in when creating or editing a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdPayload {
    pub brand: String,
    pub size: String,
    pub price: String,
}

impl AdPayload {
    pub fn new<B, S, P>(brand: B, size: S, price: P) -> Self
    where
        B: Into<String>,
        S: Into<String>,
        P: Into<String>,
    {
        AdPayload {
            brand: brand.into(),
            size: size.into(),
            price: price.into(),
        }
    }

    /// Make sure the payload is something the backend will accept.
    ///
    /// The brand and size can't be blank and the price needs to be a
    /// positive number.
    pub fn validate(&self) -> Result<(), InvalidAd> {
        if self.brand.trim().is_empty() {
            return Err(InvalidAd::MissingField { name: "brand" });
        }
        if self.size.trim().is_empty() {
            return Err(InvalidAd::MissingField { name: "size" });
        }

        match self.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price > 0.0 => Ok(()),
            _ => Err(InvalidAd::BadPrice {
                price: self.price.clone(),
            }),
        }
    }
}

/// The reason an [`AdPayload`] was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidAd {
    #[error("The {} is required", name)]
    MissingField { name: &'static str },
    #[error("\"{}\" isn't a valid price", price)]
    BadPrice { price: String },
}

/// Accept either a JSON string or a JSON number, keeping the value as text.
///
/// The backend isn't consistent about how it encodes monetary amounts. Strings
/// are passed through untouched, but a JSON number has already been through
/// an `f64` by the time we see it, so `10.50` comes back as `"10.5"`. A
/// `null` (e.g. a sum over no rows) is read as `"0"`.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl<'de> de::Visitor<'de> for Visitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::from("0"))
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::from("0"))
        }
    }

    deserializer.deserialize_any(Visitor)
}

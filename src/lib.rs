//! Client-side state for a second-hand marketplace, plus a typed interface
//! to the marketplace's HTTP API.
//!
//! The interesting bits are the [`Session`] (who is logged in), the [`Cart`]
//! (what they want to buy) and the navigation guard in [`guard`], all of
//! which are persisted through a [`Storage`]. A [`Marketplace`] ties them
//! together.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod ads;
pub mod api;
mod cart;
pub mod endpoints;
pub mod guard;
mod marketplace;
mod session;
pub mod storage;

pub use ads::{Ad, AdPayload, InvalidAd};
pub use api::{BaseUrl, Unauthenticated};
pub use cart::{Cart, CartEntry, CART_KEY};
pub use guard::{Decision, Route};
pub use marketplace::{CannotBuy, Marketplace};
pub use session::{Session, EMAIL_KEY, LOGGED_IN_KEY, TOKEN_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// The default user agent to use when communicating with the backend.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

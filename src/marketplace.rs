use crate::{
    ads::Ad,
    api::{self, BaseUrl, Unauthenticated},
    cart::{Cart, CartEntry},
    endpoints::{self, AuthError, EndpointError},
    guard::{self, Decision},
    session::Session,
    storage::Storage,
};
use reqwest::{header::HeaderMap, Client};

/// Owns the client's state and wires it up to a single [`Storage`].
///
/// Nothing else in the crate holds on to a session or cart, so this is the
/// one place to look when you want to know who is logged in and what's in
/// their cart.
#[derive(Debug)]
pub struct Marketplace<S> {
    session: Session<S>,
    cart: Cart<S>,
}

impl<S: Storage + Clone> Marketplace<S> {
    /// Restore whatever state was previously saved to `storage`.
    pub fn open(storage: S) -> Self {
        Marketplace {
            session: Session::load(storage.clone()),
            cart: Cart::load(storage),
        }
    }

    pub fn session(&self) -> &Session<S> { &self.session }

    pub fn session_mut(&mut self) -> &mut Session<S> { &mut self.session }

    pub fn cart(&self) -> &Cart<S> { &self.cart }

    pub fn cart_mut(&mut self) -> &mut Cart<S> { &mut self.cart }

    /// Ask the navigation guard whether we can visit `target` right now.
    pub fn navigate(&self, target: &str) -> Decision {
        guard::decide(target, self.session.is_logged_in())
    }

    /// The name of the route we'll actually end up on when navigating to
    /// `target`.
    pub fn destination(&self, target: &str) -> String {
        guard::resolve(target, self.session.is_logged_in())
    }

    pub fn auth_headers(&self) -> Result<HeaderMap, Unauthenticated> {
        api::auth_headers(&self.session)
    }

    /// Log in with the backend and remember the token it gives us.
    pub async fn login(
        &mut self,
        client: &Client,
        base_url: &BaseUrl,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let token = endpoints::login(client, base_url, email, password).await?;
        self.session.login(&token, email);
        Ok(())
    }

    /// Create an account and log straight into it.
    pub async fn register(
        &mut self,
        client: &Client,
        base_url: &BaseUrl,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let token =
            endpoints::register(client, base_url, email, password).await?;
        self.session.login(&token, email);
        Ok(())
    }

    /// Forget the current user. The cart is left alone.
    pub fn logout(&mut self) { self.session.logout(); }

    /// Put a listing in the cart, returning `false` if it was already there.
    ///
    /// You can't buy your own listings or ones which have already been sold.
    pub fn add_to_cart(&mut self, ad: &Ad) -> Result<bool, CannotBuy> {
        if ad.is_sold() {
            return Err(CannotBuy::AlreadySold { id: ad.id });
        }
        if let Some(email) = self.session.user_email() {
            if ad.is_owned_by(email) {
                return Err(CannotBuy::OwnListing { id: ad.id });
            }
        }

        Ok(self.cart.add_to_cart(CartEntry::from(ad)))
    }

    /// Buy everything in the cart, emptying it once the backend accepts the
    /// purchase. Returns how many items were bought.
    pub async fn checkout(
        &mut self,
        client: &Client,
        base_url: &BaseUrl,
    ) -> Result<usize, EndpointError> {
        let auth = self.auth_headers()?;

        if self.cart.is_empty() {
            log::debug!("Nothing to check out");
            return Ok(0);
        }

        let ids = self.cart.ids();
        endpoints::checkout(client, base_url, &auth, &ids).await?;
        self.cart.clear_cart();

        Ok(ids.len())
    }
}

/// Why a listing couldn't be added to the cart.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CannotBuy {
    #[error("Listing {} is yours", id)]
    OwnListing { id: i64 },
    #[error("Listing {} has already been sold", id)]
    AlreadySold { id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cart::CART_KEY, guard::Route, storage::MemoryStorage};

    fn ad(id: i64, owner: &str) -> Ad {
        Ad {
            id,
            brand: String::from("Nike"),
            size: String::from("42"),
            price: String::from("10"),
            owner_email: owner.to_string(),
            image_path: None,
            sold: Some(false),
            buyer_email: None,
        }
    }

    #[test]
    fn session_and_cart_share_the_same_storage() {
        let storage = MemoryStorage::new();
        let mut market = Marketplace::open(storage.clone());

        market.session_mut().login("t-xyz", "me@example.com");
        market.add_to_cart(&ad(2, "other@example.com")).unwrap();

        let reopened = Marketplace::open(storage);
        assert!(reopened.session().is_logged_in());
        assert_eq!(reopened.cart().ids(), vec![2]);
    }

    #[test]
    fn navigation_follows_the_session() {
        let mut market = Marketplace::open(MemoryStorage::new());

        assert_eq!(market.navigate("home"), Decision::Redirect(Route::Login));
        assert_eq!(market.destination("cart"), "login");

        market.session_mut().login("t-xyz", "me@example.com");

        assert_eq!(market.navigate("home"), Decision::Allow);
        assert_eq!(market.destination("login"), "home");
        assert_eq!(market.destination("register"), "home");
    }

    #[test]
    fn you_cant_buy_your_own_listing() {
        let mut market = Marketplace::open(MemoryStorage::new());
        market.session_mut().login("t-xyz", "me@example.com");

        let got = market.add_to_cart(&ad(1, "me@example.com"));

        assert_eq!(got, Err(CannotBuy::OwnListing { id: 1 }));
        assert!(market.cart().is_empty());
    }

    #[test]
    fn sold_listings_cant_be_bought() {
        let mut market = Marketplace::open(MemoryStorage::new());
        let mut sold = ad(3, "other@example.com");
        sold.sold = Some(true);

        assert_eq!(
            market.add_to_cart(&sold),
            Err(CannotBuy::AlreadySold { id: 3 })
        );
    }

    #[test]
    fn adding_a_listing_twice() {
        let mut market = Marketplace::open(MemoryStorage::new());
        let listing = ad(2, "other@example.com");

        assert_eq!(market.add_to_cart(&listing), Ok(true));
        assert_eq!(market.add_to_cart(&listing), Ok(false));
        assert_eq!(market.cart().count(), 1);
    }

    #[test]
    fn logging_out_keeps_the_cart() {
        let storage = MemoryStorage::new();
        let mut market = Marketplace::open(storage.clone());
        market.session_mut().login("t-xyz", "me@example.com");
        market.add_to_cart(&ad(2, "other@example.com")).unwrap();

        market.logout();

        assert!(!market.session().is_logged_in());
        assert_eq!(market.cart().count(), 1);
        assert!(storage.get(CART_KEY).is_some());
        assert_eq!(market.auth_headers(), Err(Unauthenticated));
    }

    #[tokio::test]
    async fn checkout_needs_a_login() {
        let mut market = Marketplace::open(MemoryStorage::new());
        market.add_to_cart(&ad(2, "other@example.com")).unwrap();
        let client = Client::new();
        let base_url = BaseUrl::parse("http://localhost:1").unwrap();

        let got = market.checkout(&client, &base_url).await;

        assert!(matches!(got, Err(EndpointError::Unauthenticated(_))));
        assert_eq!(market.cart().count(), 1);
    }

    #[tokio::test]
    async fn checking_out_an_empty_cart_sends_nothing() {
        let mut market = Marketplace::open(MemoryStorage::new());
        market.session_mut().login("t-xyz", "me@example.com");
        let client = Client::new();
        // nothing listens here, so any request would fail
        let base_url = BaseUrl::parse("http://localhost:1").unwrap();

        let got = market.checkout(&client, &base_url).await.unwrap();

        assert_eq!(got, 0);
    }
}

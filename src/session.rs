use crate::storage::Storage;

/// The storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// The storage key holding the logged in user's email address.
pub const EMAIL_KEY: &str = "email";
/// A marker which is set to `"true"` while somebody is logged in.
pub const LOGGED_IN_KEY: &str = "loggedIn";

/// Who is currently logged in, if anyone.
///
/// The token and email are always set (or cleared) together, and every
/// change is written straight through to the underlying [`Storage`].
#[derive(Debug)]
pub struct Session<S> {
    storage: S,
    token: Option<String>,
    email: Option<String>,
}

impl<S: Storage> Session<S> {
    /// Restore the session persisted in `storage`.
    ///
    /// If either the token or the email is missing we treat the user as
    /// logged out, even when a stale key is still lying around. A restored
    /// session always gets its `loggedIn` marker back.
    pub fn load(storage: S) -> Self {
        let (token, email) =
            match (storage.get(TOKEN_KEY), storage.get(EMAIL_KEY)) {
                (Some(token), Some(email)) => {
                    log::debug!("Restored the session for {}", email);
                    if storage.get(LOGGED_IN_KEY).as_deref() != Some("true") {
                        storage.set(LOGGED_IN_KEY, "true");
                    }
                    (Some(token), Some(email))
                },
                (None, None) => (None, None),
                _ => {
                    log::debug!("Ignoring a partially persisted session");
                    (None, None)
                },
            };

        Session {
            storage,
            token,
            email,
        }
    }

    /// Remember `token` as the credential for `email`.
    ///
    /// The token isn't validated. Whoever did the authentication is
    /// responsible for handing us something meaningful.
    pub fn login(&mut self, token: &str, email: &str) {
        log::info!("Logged in as {}", email);

        self.token = Some(token.to_string());
        self.email = Some(email.to_string());

        self.storage.set(TOKEN_KEY, token);
        self.storage.set(EMAIL_KEY, email);
        self.storage.set(LOGGED_IN_KEY, "true");
    }

    /// Forget the current user. Logging out twice is harmless.
    pub fn logout(&mut self) {
        if let Some(email) = self.email.take() {
            log::info!("Logging out {}", email);
        }
        self.token = None;

        self.storage.remove(TOKEN_KEY);
        self.storage.remove(EMAIL_KEY);
        self.storage.remove(LOGGED_IN_KEY);
    }

    /// An empty token doesn't count, even though [`Session::login()`] will
    /// happily store one.
    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().filter(|t| !t.is_empty()).is_some()
    }

    pub fn auth_token(&self) -> Option<&str> { self.token.as_deref() }

    pub fn user_email(&self) -> Option<&str> { self.email.as_deref() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn a_fresh_store_is_logged_out() {
        let session = Session::load(MemoryStorage::new());

        assert!(!session.is_logged_in());
        assert_eq!(session.auth_token(), None);
        assert_eq!(session.user_email(), None);
    }

    #[test]
    fn login_updates_state_and_storage() {
        let storage = MemoryStorage::new();
        let mut session = Session::load(storage.clone());

        session.login("t-123", "test@example.com");

        assert!(session.is_logged_in());
        assert_eq!(session.auth_token(), Some("t-123"));
        assert_eq!(session.user_email(), Some("test@example.com"));
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("t-123"));
        assert_eq!(storage.get(EMAIL_KEY).as_deref(), Some("test@example.com"));
        assert_eq!(storage.get(LOGGED_IN_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn logout_clears_everything() {
        let storage = MemoryStorage::new();
        let mut session = Session::load(storage.clone());
        session.login("t-xyz", "me@example.com");

        session.logout();

        assert!(!session.is_logged_in());
        assert_eq!(session.auth_token(), None);
        assert_eq!(session.user_email(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn logging_out_twice_is_a_noop() {
        let storage = MemoryStorage::new();
        let mut session = Session::load(storage.clone());

        session.logout();
        session.logout();

        assert!(!session.is_logged_in());
        assert!(storage.is_empty());
    }

    #[test]
    fn a_later_login_overwrites_the_earlier_one() {
        let storage = MemoryStorage::new();
        let mut session = Session::load(storage.clone());

        session.login("first", "a@example.com");
        session.login("second", "b@example.com");

        assert_eq!(session.auth_token(), Some("second"));
        assert_eq!(storage.get(EMAIL_KEY).as_deref(), Some("b@example.com"));
    }

    #[test]
    fn the_session_is_restored_from_storage() {
        let storage = MemoryStorage::new();
        Session::load(storage.clone()).login("t-123", "test@example.com");

        let restored = Session::load(storage);

        assert!(restored.is_logged_in());
        assert_eq!(restored.user_email(), Some("test@example.com"));
    }

    #[test]
    fn a_stale_token_without_an_email_is_logged_out() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "stale");
        storage.set(LOGGED_IN_KEY, "true");

        let session = Session::load(storage);

        assert!(!session.is_logged_in());
        assert_eq!(session.auth_token(), None);
    }

    #[test]
    fn restoring_a_session_puts_back_a_missing_marker() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "t-123");
        storage.set(EMAIL_KEY, "test@example.com");

        let session = Session::load(storage.clone());

        assert!(session.is_logged_in());
        assert_eq!(storage.get(LOGGED_IN_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn a_session_can_borrow_its_storage() {
        let storage = MemoryStorage::new();

        Session::load(&storage).login("t-123", "test@example.com");

        assert_eq!(storage.get(LOGGED_IN_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn empty_tokens_are_accepted() {
        let mut session = Session::load(MemoryStorage::new());

        session.login("", "me@example.com");

        assert_eq!(session.auth_token(), Some(""));
        assert_eq!(session.user_email(), Some("me@example.com"));
        assert!(!session.is_logged_in());
    }

    proptest::proptest! {
        #[test]
        fn logout_undoes_any_login(token in ".*", email in ".+@[a-z]+\\.[a-z]{2,3}") {
            let storage = MemoryStorage::new();
            let mut session = Session::load(storage.clone());

            session.login(&token, &email);
            session.logout();

            proptest::prop_assert!(!session.is_logged_in());
            proptest::prop_assert_eq!(storage.get(TOKEN_KEY), None);
            proptest::prop_assert_eq!(storage.get(EMAIL_KEY), None);
            proptest::prop_assert_eq!(storage.get(LOGGED_IN_KEY), None);
        }
    }
}

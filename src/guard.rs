//! Routing and the navigation guard.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// Every page in the application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
    Ads,
    CreateAd,
    Cart,
    Profile,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Ads,
        Route::CreateAd,
        Route::Cart,
        Route::Profile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Register => "register",
            Route::Home => "home",
            Route::Ads => "ads",
            Route::CreateAd => "create-ad",
            Route::Cart => "cart",
            Route::Profile => "profile",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Register => "/register",
            Route::Home => "/home",
            Route::Ads => "/ads",
            Route::CreateAd => "/ads/new",
            Route::Cart => "/cart",
            Route::Profile => "/profile",
        }
    }

    pub fn from_name(name: &str) -> Option<Route> {
        Route::ALL.iter().copied().find(|r| r.name() == name)
    }

    /// Find the route mounted at `path`, ignoring any trailing slashes.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        Route::ALL.iter().copied().find(|r| r.path() == path)
    }

    /// Can this route be visited without logging in?
    pub fn is_public(self) -> bool { is_public(self.name()) }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Parse either a route name (`"create-ad"`) or a path (`"/ads/new"`).
    fn from_str(s: &str) -> Result<Route, Self::Err> {
        let found = if s.starts_with('/') {
            Route::from_path(s)
        } else {
            Route::from_name(s)
        };

        found.ok_or_else(|| UnknownRoute {
            route: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("There is no \"{}\" route", route)]
pub struct UnknownRoute {
    pub route: String,
}

/// What the router should do with a navigation attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Route),
}

fn is_public(name: &str) -> bool {
    name == Route::Login.name() || name == Route::Register.name()
}

/// Decide whether the user may navigate to `target`.
///
/// Anonymous users can only see the login and registration pages, and users
/// who are already logged in get sent home instead of to those pages. Names
/// we don't recognise are treated like any other protected page.
pub fn decide(target: &str, is_logged_in: bool) -> Decision {
    match (is_logged_in, is_public(target)) {
        (false, false) => Decision::Redirect(Route::Login),
        (true, true) => Decision::Redirect(Route::Home),
        _ => Decision::Allow,
    }
}

/// Keep applying [`decide()`] until navigation is allowed, returning the
/// name of the route the user ends up on.
pub fn resolve(target: &str, is_logged_in: bool) -> String {
    match decide(target, is_logged_in) {
        Decision::Allow => target.to_string(),
        Decision::Redirect(route) => {
            log::debug!("Redirecting from \"{}\" to \"{}\"", target, route);

            // login is public and home is protected, so one redirect is
            // always enough
            debug_assert_eq!(decide(route.name(), is_logged_in), Decision::Allow);
            route.name().to_string()
        },
    }
}

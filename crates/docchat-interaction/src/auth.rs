//! Credential and session-expiry plumbing for the HTTP gateway.

use docchat_core::auth::{CredentialProvider, Navigator};
use std::sync::{Arc, PoisonError, RwLock};

/// Query flag appended to the login route after an expiry redirect.
pub const SESSION_EXPIRED_QUERY: &str = "session_expired=true";

/// Replaceable bearer token holder.
///
/// The host's auth subsystem calls [`set_token`](Self::set_token) after a
/// login and [`clear`](Self::clear) after a logout; requests read whatever
/// is current at send time.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }
}

/// Sends the reader to the login route when the backend answers 401.
#[derive(Clone)]
pub struct SessionExpiryHandler {
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl SessionExpiryHandler {
    pub fn new(navigator: Arc<dyn Navigator>, login_route: impl Into<String>) -> Self {
        Self {
            navigator,
            login_route: login_route.into(),
        }
    }

    /// Where the reader lands after an expiry, e.g. `/login?session_expired=true`.
    pub fn redirect_target(&self) -> String {
        format!("{}?{}", self.login_route, SESSION_EXPIRED_QUERY)
    }

    /// Whether `path` is the login route itself, a sub-path of it, or the
    /// route with a query string. `/login-help` is not.
    fn is_login_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.login_route.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    /// Redirects unless the reader is already on the login route.
    ///
    /// Returns whether a navigation was issued.
    pub fn handle(&self) -> bool {
        let current = self.navigator.current_path();
        if self.is_login_path(&current) {
            tracing::debug!("[SessionExpiry] Already on {}, not redirecting", current);
            return false;
        }

        let target = self.redirect_target();
        tracing::warn!("[SessionExpiry] Credentials rejected, redirecting to {}", target);
        self.navigator.navigate(&target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeNavigator {
        path: String,
        visited: Mutex<Vec<String>>,
    }

    impl FakeNavigator {
        fn at(path: &str) -> Arc<Self> {
            Arc::new(Self {
                path: path.to_string(),
                visited: Mutex::new(Vec::new()),
            })
        }
    }

    impl Navigator for FakeNavigator {
        fn current_path(&self) -> String {
            self.path.clone()
        }

        fn navigate(&self, target: &str) {
            self.visited.lock().unwrap().push(target.to_string());
        }
    }

    #[test]
    fn test_redirects_from_content_pages() {
        let navigator = FakeNavigator::at("/docs/locomotion");
        let handler = SessionExpiryHandler::new(navigator.clone(), "/login");

        assert!(handler.handle());
        assert_eq!(
            *navigator.visited.lock().unwrap(),
            vec!["/login?session_expired=true".to_string()]
        );
    }

    #[test]
    fn test_stays_put_on_login_route() {
        let navigator = FakeNavigator::at("/login");
        let handler = SessionExpiryHandler::new(navigator.clone(), "/login");

        assert!(!handler.handle());
        assert!(navigator.visited.lock().unwrap().is_empty());
    }

    #[test]
    fn test_login_query_and_subpaths_count_as_login() {
        for path in ["/login?session_expired=true", "/login/sso"] {
            let navigator = FakeNavigator::at(path);
            let handler = SessionExpiryHandler::new(navigator.clone(), "/login");

            assert!(!handler.handle(), "redirected from {path}");
            assert!(navigator.visited.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn test_routes_sharing_the_login_prefix_still_redirect() {
        for path in ["/login-help", "/loginx"] {
            let navigator = FakeNavigator::at(path);
            let handler = SessionExpiryHandler::new(navigator.clone(), "/login");

            assert!(handler.handle(), "stayed on {path}");
            assert_eq!(
                *navigator.visited.lock().unwrap(),
                vec!["/login?session_expired=true".to_string()]
            );
        }
    }

    #[test]
    fn test_credentials_can_be_replaced() {
        let credentials = StaticCredentials::default();
        assert_eq!(credentials.access_token(), None);

        credentials.set_token("tok-1");
        assert_eq!(credentials.access_token().as_deref(), Some("tok-1"));

        credentials.set_token("");
        assert_eq!(credentials.access_token(), None);

        credentials.set_token("tok-2");
        credentials.clear();
        assert_eq!(credentials.access_token(), None);
    }
}

//! Seams to the host application's authentication subsystem.

/// Supplies the bearer token attached to backend requests.
pub trait CredentialProvider: Send + Sync {
    /// Current access token, `None` for anonymous requests.
    fn access_token(&self) -> Option<String>;
}

/// Client-side navigation of the host application.
pub trait Navigator: Send + Sync {
    /// Path of the current location (e.g. `/docs/intro`).
    fn current_path(&self) -> String;

    /// Navigates to `target` (path plus optional query string).
    fn navigate(&self, target: &str);
}

/// Anonymous access: never attaches a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn access_token(&self) -> Option<String> {
        None
    }
}

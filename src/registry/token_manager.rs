//! Session token storage and refresh
//!
//! The registry does not advertise token lifetimes, so expiry is only
//! detected when a call comes back 401. The stored token sits behind a lock so
//! that a refresh made through one handle is seen by every later query.

use crate::logging::Logger;
use crate::registry::auth::Auth;
use std::sync::{Arc, RwLock};

/// Shared holder of the current bearer token
#[derive(Debug, Clone)]
pub struct TokenManager {
    auth: Auth,
    token: Arc<RwLock<Option<String>>>,
    output: Logger,
}

impl TokenManager {
    pub fn new(auth: Auth, output: Logger) -> Self {
        Self {
            auth,
            token: Arc::new(RwLock::new(None)),
            output,
        }
    }

    /// Authenticate and store the token if one was issued
    pub async fn login(&self) -> bool {
        match self.auth.authenticate().await {
            Some(token) => {
                self.store(token);
                true
            }
            None => {
                self.output
                    .warning("Authentication failed - services will be unavailable until a token is obtained");
                false
            }
        }
    }

    /// Re-authenticate, replacing the token only on success
    pub async fn refresh(&self) -> bool {
        self.output.info("Refreshing authentication token...");
        match self.auth.authenticate().await {
            Some(token) => {
                self.store(token);
                self.output.success("Token refreshed successfully");
                true
            }
            None => {
                self.output.error("Token refresh failed; keeping the previous token");
                false
            }
        }
    }

    /// Current token, if any
    pub fn current(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    pub fn has_token(&self) -> bool {
        self.current().is_some()
    }

    fn store(&self, token: String) {
        match self.token.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }
}

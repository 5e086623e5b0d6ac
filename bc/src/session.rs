//! Signed-in session: bearer credential and identity
//!
//! Both live in the injected key-value store so they survive restarts. A 401
//! from any authenticated service calls [`Session::invalidate`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sessionstore::{KeyValueStore, TOKEN_KEY, USER_INFO_KEY, get_json, set_json};
use tracing::{debug, info, warn};

/// Identity carried in the credential's claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub did: String,
    #[serde(default)]
    pub username: String,
}

/// Handle to the stored credential; cheap to clone
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current bearer credential, if signed in
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "token: failed to read credential");
                None
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    /// Signed-in identity, if known
    pub fn user(&self) -> Option<UserInfo> {
        match get_json::<UserInfo>(self.store.as_ref(), USER_INFO_KEY) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "user: stored identity unreadable");
                None
            }
        }
    }

    /// Store a credential and the identity decoded from its claims
    ///
    /// The token is stored even when its claims cannot be decoded; only the
    /// identity is left empty in that case.
    pub fn sign_in(&self, token: &str) -> eyre::Result<Option<UserInfo>> {
        debug!("sign_in: called");
        let token = token.trim();
        if token.is_empty() {
            return Err(eyre::eyre!("Token is empty"));
        }
        self.store.set(TOKEN_KEY, token)?;

        let user = decode_claims(token);
        match &user {
            Some(user) => {
                set_json(self.store.as_ref(), USER_INFO_KEY, user)?;
                info!(username = %user.username, "sign_in: signed in");
            }
            None => {
                self.store.clear(USER_INFO_KEY)?;
                warn!("sign_in: could not decode token claims");
            }
        }
        Ok(user)
    }

    /// Forget the credential and identity
    pub fn invalidate(&self) {
        info!("invalidate: clearing session");
        if let Err(e) = self.store.clear(TOKEN_KEY) {
            warn!(error = %e, "invalidate: failed to clear token");
        }
        if let Err(e) = self.store.clear(USER_INFO_KEY) {
            warn!(error = %e, "invalidate: failed to clear user info");
        }
    }
}

/// Decode `{did, username}` from the payload segment of a JWT
fn decode_claims(token: &str) -> Option<UserInfo> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

//! Authorization header construction from stored credentials.

use std::sync::Arc;
use turbonet_memory::CredentialStore;
use turbonet_types::error::TurboNetResult;
use zeroize::Zeroizing;

/// Header name carrying the bot credential.
pub const AUTHORIZATION: &str = "Authorization";
/// Scheme prefix for the credential.
pub const BOT_KEY_SCHEME: &str = "BotKey";

/// A ready-to-send `Authorization: BotKey <credential>` header.
///
/// Only this copy is wiped on drop. Once the value is attached to an
/// `ApiRequest` it lives in a plain `String` until the request is dropped.
pub struct AuthHeader {
    value: Zeroizing<String>,
}

impl AuthHeader {
    fn from_credential(credential: &str) -> Self {
        Self {
            value: Zeroizing::new(format!("{BOT_KEY_SCHEME} {credential}")),
        }
    }

    pub fn name(&self) -> &'static str {
        AUTHORIZATION
    }

    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthHeader(BotKey <redacted>)")
    }
}

/// Builds authorization headers from the credential store.
///
/// `Ok(None)` is the universal "not bound" signal: callers must short-circuit
/// before making any API call.
#[derive(Clone)]
pub struct AuthHeaderBuilder {
    store: Arc<dyn CredentialStore>,
}

impl AuthHeaderBuilder {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Header for `user_id`, or `None` if it has no non-empty credential.
    pub fn build(&self, user_id: &str) -> TurboNetResult<Option<AuthHeader>> {
        let credential = self.store.get(user_id)?.map(Zeroizing::new);
        Ok(credential
            .filter(|c| !c.is_empty())
            .map(|c| AuthHeader::from_credential(&c)))
    }
}

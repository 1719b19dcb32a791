//! Auth Aggregate: a single-account mock identity store

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::value_objects::require_text;
use crate::storage::{keys, load_json, KeyValueStore, save_json};
use crate::{FieldErrors, Result};

/// The signed-in identity, as the rest of the storefront sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub name: String,
    pub email: String,
}

/// The one persisted account. Sign up replaces it wholesale.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRecord {
    name: String,
    email: String,
    salt: String,
    password_hash: String,
}

impl CredentialRecord {
    fn new(name: &str, email: &str, password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&salt, password);
        Self { name: name.to_owned(), email: email.to_owned(), salt, password_hash }
    }

    fn verify(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password_hash == hash_password(&self.salt, password)
    }

    fn session(&self) -> UserSession { UserSession { name: self.name.clone(), email: self.email.clone() } }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn issue_token() -> String { format!("mock_jwt_{}", Utc::now().timestamp_millis()) }

#[derive(Debug)]
pub struct Auth {
    store: Arc<dyn KeyValueStore>,
    session: Option<UserSession>,
}

impl Auth {
    /// A session is active when both a token and a credential record are
    /// stored. The token's value is never checked.
    pub fn hydrate(store: Arc<dyn KeyValueStore>) -> Self {
        let has_token = match store.get(keys::AUTH_TOKEN) {
            Ok(token) => token.is_some_and(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read auth token");
                false
            }
        };
        let session = if has_token {
            load_json::<CredentialRecord>(store.as_ref(), keys::USER).map(|r| r.session())
        } else {
            None
        };
        Self { store, session }
    }

    pub fn user(&self) -> Option<&UserSession> { self.session.as_ref() }
    pub fn is_authenticated(&self) -> bool { self.session.is_some() }

    /// Returns `Ok(false)` when any field is empty. Otherwise overwrites the
    /// stored account and signs in as it.
    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<bool> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Ok(false);
        }
        let record = CredentialRecord::new(name, email, password);
        save_json(self.store.as_ref(), keys::USER, &record)?;
        self.store.set(keys::AUTH_TOKEN, &issue_token())?;
        self.session = Some(record.session());
        tracing::info!(email, "account created");
        Ok(true)
    }

    /// Returns `Ok(false)` when no account exists or the credentials differ.
    pub fn login(&mut self, email: &str, password: &str) -> Result<bool> {
        let Some(record) = load_json::<CredentialRecord>(self.store.as_ref(), keys::USER) else {
            return Ok(false);
        };
        if !record.verify(email, password) {
            tracing::debug!(email, "login rejected");
            return Ok(false);
        }
        self.store.set(keys::AUTH_TOKEN, &issue_token())?;
        self.session = Some(record.session());
        Ok(true)
    }

    /// Drops the token and the in-memory session. The account stays stored.
    pub fn logout(&mut self) -> Result<()> {
        self.session = None;
        self.store.remove(keys::AUTH_TOKEN)
    }
}

/// Sign-up form as submitted from the account page.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(custom = "name_present")]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl SignupForm {
    pub fn check(&self) -> std::result::Result<(), FieldErrors> { self.validate().map_err(FieldErrors::from) }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn name_present(value: &str) -> std::result::Result<(), ValidationError> {
    require_text(value, "Please enter your name")
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated Garmin Connect session.
//!
//! Sign in is a form login followed by two identity lookups:
//! 1. GET the sign-in page to collect session cookies
//! 2. POST the login form
//! 3. Ask for the current user name (empty when the login was rejected)
//! 4. Fetch the account record for the numeric user id

use crate::config::Config;
use crate::error::{GarminError, Result};
use crate::models::Identity;
use crate::services::garmin::{GarminClient, ACCOUNT_PATH, SIGNIN_PATH, USERNAME_PATH};
use serde::Deserialize;

/// One signed-in (or not yet signed-in) connection to Garmin Connect.
///
/// Owns its HTTP client and cookie store. Not meant to be shared between
/// threads; sign in takes `&mut self`.
pub struct Session {
    client: GarminClient,
    config: Config,
    identity: Option<Identity>,
}

impl Session {
    /// Create an unauthenticated session with a fresh client.
    pub fn new(config: Config) -> Result<Self> {
        let client = GarminClient::new(&config)?;
        Ok(Self::with_client(client, config))
    }

    /// Create an unauthenticated session around an existing client.
    pub fn with_client(client: GarminClient, config: Config) -> Self {
        Self {
            client,
            config,
            identity: None,
        }
    }

    /// Sign in, reporting only whether it worked.
    ///
    /// Never fails: transport and parse problems are logged and reported as
    /// `false`. Use [`Session::try_sign_in`] to see why.
    pub fn sign_in(&mut self, username: &str, password: &str) -> bool {
        match self.try_sign_in(username, password) {
            Ok(identity) => {
                tracing::info!(
                    user_id = identity.user_id,
                    user_name = %identity.user_name,
                    "Signed in"
                );
                true
            }
            Err(GarminError::SignInRejected(user)) => {
                tracing::warn!(user = %user, "Sign in rejected");
                false
            }
            Err(e) if e.is_remote() => {
                tracing::error!(error = %e, "Sign in failed talking to Garmin Connect");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign in not attempted");
                false
            }
        }
    }

    /// Sign in and return the account identity.
    ///
    /// Any failure leaves the session unauthenticated.
    pub fn try_sign_in(&mut self, username: &str, password: &str) -> Result<Identity> {
        self.identity = None;

        if username.is_empty() || password.is_empty() {
            return Err(GarminError::InvalidInput(
                "username and password must not be empty".to_string(),
            ));
        }

        let identity = self.authenticate(username, password)?;
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<Identity> {
        let form = [
            ("login", "login"),
            ("login:loginUsernameField", username),
            ("login:password", password),
            ("login:signInButton", "Sign In"),
            ("javax.faces.ViewState", self.config.view_state.as_str()),
        ];

        self.client.get(SIGNIN_PATH)?;
        self.client.post_form(SIGNIN_PATH, &form)?;

        let current: UsernameResponse = self.client.get_json(USERNAME_PATH, &[])?;
        if current.username.is_empty() {
            return Err(GarminError::SignInRejected(username.to_string()));
        }
        tracing::debug!(user_name = %current.username, "Login accepted, fetching account");

        let account: AccountResponse = self.client.get_json(ACCOUNT_PATH, &[])?;
        let user_id = account.account.user_id.value()?;

        Ok(Identity {
            user_id,
            user_name: account.account.username,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Numeric user id, `None` until a sign in succeeds.
    pub fn user_id(&self) -> Option<u64> {
        self.identity.as_ref().map(|i| i.user_id)
    }

    /// User name, empty until a sign in succeeds.
    pub fn user_name(&self) -> &str {
        self.identity
            .as_ref()
            .map(|i| i.user_name.as_str())
            .unwrap_or("")
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn client(&self) -> &GarminClient {
        &self.client
    }
}

/// `GET /user/username` response.
#[derive(Debug, Deserialize)]
struct UsernameResponse {
    #[serde(default)]
    username: String,
}

/// `GET .../json/account` response.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    account: Account,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    user_id: UserId,
    username: String,
}

/// The account service sends the id as a string; accept a number too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    fn value(&self) -> Result<u64> {
        let id = match self {
            UserId::Number(n) => *n,
            UserId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| GarminError::Parse(format!("userId is not an integer: {:?}", s)))?,
        };
        u64::try_from(id)
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| GarminError::Parse(format!("userId is not positive: {}", id)))
    }
}

use std::collections::BTreeMap;
use std::str::FromStr;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Error;

/// How a login password is checked against the credentials file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordCheck {
    /// The password must belong to *some* registered user. This is how the
    /// bank has always behaved: any user's password opens any username.
    #[default]
    AnyUser,
    /// The password must be the one registered for the given username.
    SameUser,
}

/// Reasons a login attempt is refused. The messages are shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Enter both username and password")]
    MissingCredentials,
    #[error("Not a registered username")]
    UnknownUsername,
    #[error("Invalid password")]
    InvalidPassword,
}

/// Read-only username to password mapping, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(path: &Utf8Path) -> Result<Self, Error> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::ReadError {
                path: path.to_owned(),
                source,
            })?;
        let credentials: Credentials =
            serde_json::from_str(&raw).map_err(|source| Error::ParseError {
                path: path.to_owned(),
                source,
            })?;
        tracing::debug!(path = path.as_str(), users = credentials.len(), "loaded credentials");
        Ok(credentials)
    }

    pub async fn save(&self, path: &Utf8Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| Error::WriteError {
                path: path.to_owned(),
                source,
            })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds or replaces a user, returning whether the user already existed.
    pub fn insert(&mut self, username: &str, password: &str) -> bool {
        self.0
            .insert(username.to_string(), password.to_string())
            .is_some()
    }

    /// Checks a login attempt. Blank fields are reported first, then an
    /// unknown username, then a bad password.
    pub fn verify(
        &self,
        username: &str,
        password: &str,
        check: PasswordCheck,
    ) -> Result<(), LoginError> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let registered_password = self.0.get(username).ok_or(LoginError::UnknownUsername)?;

        let password_matches = match check {
            PasswordCheck::AnyUser => self.0.values().any(|p| p == password),
            PasswordCheck::SameUser => registered_password == password,
        };

        if password_matches {
            Ok(())
        } else {
            Err(LoginError::InvalidPassword)
        }
    }
}

impl FromIterator<(String, String)> for Credentials {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for Credentials {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

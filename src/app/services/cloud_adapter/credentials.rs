//! Credential resolution for the cloud vendor
//!
//! A station's raw credential fields are resolved exactly once into a
//! [`CloudCredentials`] variant, which then selects the API generation used.

use crate::app::models::RawCredentials;
use crate::{Error, Result};
use std::fmt;

/// Resolved credentials, in priority order
#[derive(Clone, PartialEq, Eq)]
pub enum CloudCredentials {
    /// Keyed API (v2)
    Keyed { api_key: String, api_secret: String },
    /// Legacy token API (v1)
    Token {
        user: String,
        password: String,
        token: String,
    },
    /// Public dashboard scrape
    Dashboard { station_uuid: String },
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `Some` when every field of the set is populated, `None` when none is
fn complete_set<const N: usize>(
    kind: &str,
    fields: [(&'static str, &Option<String>); N],
) -> Result<Option<[String; N]>> {
    let values = fields.map(|(name, value)| (name, present(value)));
    let missing: Vec<&str> = values
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

    match missing.len() {
        0 => Ok(Some(values.map(|(_, value)| value.unwrap_or_default().to_string()))),
        n if n == N => Ok(None),
        _ => Err(Error::configuration(format!(
            "Incomplete {} credentials: missing {}",
            kind,
            missing.join(", ")
        ))),
    }
}

impl CloudCredentials {
    /// Resolve raw credential fields
    ///
    /// Keyed beats token beats dashboard. A partially populated set is rejected
    /// instead of falling through to a lower-priority one.
    pub fn resolve(raw: &RawCredentials) -> Result<Self> {
        if let Some([api_key, api_secret]) = complete_set(
            "keyed",
            [("api_key", &raw.api_key), ("api_secret", &raw.api_secret)],
        )? {
            return Ok(CloudCredentials::Keyed {
                api_key,
                api_secret,
            });
        }

        if let Some([user, password, token]) = complete_set(
            "token",
            [
                ("user", &raw.user),
                ("password", &raw.password),
                ("token", &raw.token),
            ],
        )? {
            return Ok(CloudCredentials::Token {
                user,
                password,
                token,
            });
        }

        if let Some([station_uuid]) =
            complete_set("dashboard", [("station_uuid", &raw.station_uuid)])?
        {
            return Ok(CloudCredentials::Dashboard { station_uuid });
        }

        Err(Error::configuration(
            "No complete credential set (api key + secret, user + password + token, or station uuid)",
        ))
    }

    /// Short name of the API generation these credentials select
    pub fn kind(&self) -> &'static str {
        match self {
            CloudCredentials::Keyed { .. } => "keyed",
            CloudCredentials::Token { .. } => "token",
            CloudCredentials::Dashboard { .. } => "dashboard",
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudCredentials::Keyed { api_key, .. } => f
                .debug_struct("Keyed")
                .field("api_key", api_key)
                .field("api_secret", &"***")
                .finish(),
            CloudCredentials::Token { user, .. } => f
                .debug_struct("Token")
                .field("user", user)
                .field("password", &"***")
                .field("token", &"***")
                .finish(),
            CloudCredentials::Dashboard { station_uuid } => f
                .debug_struct("Dashboard")
                .field("station_uuid", station_uuid)
                .finish(),
        }
    }
}

impl TryFrom<&RawCredentials> for CloudCredentials {
    type Error = Error;

    fn try_from(raw: &RawCredentials) -> Result<Self> {
        Self::resolve(raw)
    }
}

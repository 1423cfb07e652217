//! Session token sourcing and identity-token consumption.
//!
//! The token itself comes from a hosted identity provider; this module never
//! acquires or validates one. It looks the raw token up (environment,
//! config, token file), decodes the JWT payload claims without signature
//! verification, and derives the asserted [`User`]. A missing token is not
//! an error: the client simply runs anonymously. A malformed token yields no
//! identity but is still sent on requests as-is; the backend is the judge of
//! its validity.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

use crate::config::SessionConfig;
use crate::models::{Role, User};

/// Environment variable that overrides any configured token.
pub const TOKEN_ENV: &str = "LIBRIS_TOKEN";

/// Group name that maps to the admin role.
const ADMIN_GROUP: &str = "Admins";

/// A resolved session: the raw bearer token (if any) and the identity its
/// claims assert (if decodable).
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// Resolves the session from the environment and configuration.
    pub fn load(config: &SessionConfig) -> Self {
        Self::from_token(resolve_token(config))
    }

    /// Builds a session from an already-resolved token.
    pub fn from_token(token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let user = token.as_deref().and_then(decode_user);
        match (&token, &user) {
            (Some(_), Some(user)) => debug!("session identity: {} ({})", user.id, user.role),
            (Some(_), None) => debug!("session token present but its payload did not decode"),
            _ => debug!("no session token, running anonymously"),
        }

        Self { token, user }
    }

    /// The raw bearer token, if one was configured.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The identity asserted by the token's claims, if decodable.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Looks the token up: environment variable first, then the inline config
/// value, then the configured token file.
fn resolve_token(config: &SessionConfig) -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .or_else(|| config.token.clone())
        .or_else(|| read_token_file(config.token_file.as_deref()))
}

fn read_token_file(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            // Unreadable token file degrades to anonymous mode.
            warn!("could not read token file {}: {}", path.display(), e);
            None
        }
    }
}

/// Claims this client reads from the identity token's payload.
///
/// The hosted provider namespaces its claims (`cognito:*`); a plain `groups`
/// claim from another issuer maps the same way.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,

    #[serde(default, rename = "cognito:username")]
    username: Option<String>,

    #[serde(default, rename = "cognito:groups")]
    cognito_groups: Vec<String>,

    #[serde(default)]
    groups: Vec<String>,
}

impl Claims {
    fn group_names(&self) -> impl Iterator<Item = &str> {
        self.cognito_groups
            .iter()
            .chain(self.groups.iter())
            .map(String::as_str)
    }
}

/// Decodes the token's payload segment into the identity it asserts.
/// Any structural problem (not a JWT, bad base64, bad JSON) yields `None`.
fn decode_user(token: &str) -> Option<User> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;

    let role = if claims.group_names().any(|g| g == ADMIN_GROUP) {
        Role::Admin
    } else {
        Role::User
    };

    let name = claims
        .name
        .clone()
        .or_else(|| claims.username.clone())
        .unwrap_or_else(|| claims.sub.clone());

    Some(User {
        id: claims.sub,
        email: claims.email.unwrap_or_default(),
        name,
        role,
    })
}

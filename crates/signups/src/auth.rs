//! HTTP basic-auth verification against the teacher roster.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Teacher, TeacherRoster};
use crate::store::Store;

/// Username and password taken from an `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Supplied username.
    pub username: String,
    /// Supplied password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from their parts.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse the value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] if the scheme is not `Basic`, and
    /// [`Error::MalformedCredentials`] if the payload does not decode to
    /// `username:password`.
    pub fn from_authorization(value: &str) -> Result<Self> {
        let (scheme, payload) = value
            .trim()
            .split_once(' ')
            .ok_or(Error::MissingCredentials)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(Error::MissingCredentials);
        }

        let decoded = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|_| Error::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| Error::MalformedCredentials)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(Error::MalformedCredentials)?;

        Ok(Self::new(username, password))
    }

    /// Encode these credentials as an `Authorization` header value.
    #[must_use]
    pub fn to_authorization(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", general_purpose::STANDARD.encode(raw))
    }
}

/// Find the first teacher whose username and password both match.
///
/// Every teacher is checked in roster order. Username and password are each
/// compared in constant time, and both comparisons always run.
///
/// # Errors
///
/// Returns [`Error::InvalidCredentials`] if no teacher matches.
pub fn verify<'a>(roster: &'a TeacherRoster, credentials: &Credentials) -> Result<&'a Teacher> {
    roster
        .teachers
        .iter()
        .find(|teacher| {
            let username = teacher
                .username
                .as_bytes()
                .ct_eq(credentials.username.as_bytes());
            let password = teacher
                .password
                .as_bytes()
                .ct_eq(credentials.password.as_bytes());
            bool::from(username & password)
        })
        .ok_or(Error::InvalidCredentials)
}

/// Extractor for handlers that require a signed-in teacher.
///
/// The teacher roster is reloaded from the store for every request.
#[derive(Debug, Clone)]
pub struct AuthenticatedTeacher(pub Teacher);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedTeacher
where
    Arc<Store>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(Error::MissingCredentials)?;
        let header = header.to_str().map_err(|_| Error::MalformedCredentials)?;
        let credentials = Credentials::from_authorization(header)?;

        let store = Arc::<Store>::from_ref(state);
        let roster = store.load_teachers()?;

        match verify(&roster, &credentials) {
            Ok(teacher) => {
                debug!(username = %teacher.username, "teacher authenticated");
                Ok(Self(teacher.clone()))
            }
            Err(err) => {
                warn!(username = %credentials.username, "rejected teacher credentials");
                Err(err)
            }
        }
    }
}

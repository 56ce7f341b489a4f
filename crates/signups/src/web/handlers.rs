//! Request handlers for the activity and auth endpoints.
//!
//! Every handler reloads the store from disk. Roster changes require an
//! [`AuthenticatedTeacher`] and an `email` query parameter.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthenticatedTeacher;
use crate::error::{Error, Result};
use crate::model::Activities;

use super::AppState;

/// Entry page of the front-end.
pub const INDEX_PATH: &str = "/static/index.html";

/// Query string of the roster endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct EmailParams {
    /// Student email; required.
    pub email: Option<String>,
}

impl EmailParams {
    /// Take the decoded query string, or report why it could not be decoded.
    fn from_query(query: std::result::Result<Query<Self>, QueryRejection>) -> Result<String> {
        let Query(params) = query?;
        params.require()
    }

    fn require(self) -> Result<String> {
        self.email
            .ok_or(Error::MissingParameter { name: "email" })
    }
}

/// Confirmation body of a roster change.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Human readable confirmation.
    pub message: String,
}

/// Body of `GET /auth/status`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthStatus {
    /// Always true; unauthenticated callers get a 401 instead.
    pub authenticated: bool,
    /// Display name of the teacher.
    pub teacher: String,
    /// Login name of the teacher.
    pub username: String,
}

pub(super) async fn root_handler() -> Redirect {
    Redirect::temporary(INDEX_PATH)
}

pub(super) async fn activities_handler(State(state): State<AppState>) -> Result<Json<Activities>> {
    Ok(Json(state.store.load_activities()?))
}

pub(super) async fn auth_status_handler(
    AuthenticatedTeacher(teacher): AuthenticatedTeacher,
) -> Json<AuthStatus> {
    Json(AuthStatus {
        authenticated: true,
        teacher: teacher.name,
        username: teacher.username,
    })
}

pub(super) async fn signup_handler(
    AuthenticatedTeacher(teacher): AuthenticatedTeacher,
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: std::result::Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<Message>> {
    let email = EmailParams::from_query(query)?;

    state
        .store
        .update_activity(&name, |activity| activity.enroll(&email))?;

    info!(activity = %name, %email, teacher = %teacher.username, "signed up");

    Ok(Json(Message {
        message: format!("Teacher {} signed up {email} for {name}", teacher.name),
    }))
}

pub(super) async fn unregister_handler(
    AuthenticatedTeacher(teacher): AuthenticatedTeacher,
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: std::result::Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<Message>> {
    let email = EmailParams::from_query(query)?;

    state
        .store
        .update_activity(&name, |activity| activity.withdraw(&email))?;

    info!(activity = %name, %email, teacher = %teacher.username, "unregistered");

    Ok(Json(Message {
        message: format!("Teacher {} unregistered {email} from {name}", teacher.name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn email_from(uri: &'static str) -> Result<String> {
        crate::logging::init_test_logging();
        EmailParams::from_query(Query::try_from_uri(&Uri::from_static(uri)))
    }

    #[test]
    fn test_email_from_query() {
        assert_eq!(
            email_from("/activities/x/signup?email=a%40x.com").unwrap(),
            "a@x.com"
        );
    }

    #[test]
    fn test_email_from_query_without_email() {
        let err = email_from("/activities/x/signup?other=1").unwrap_err();
        assert!(matches!(err, Error::MissingParameter { name: "email" }));
    }

    #[test]
    fn test_repeated_email_is_invalid_query() {
        let err = email_from("/activities/x/signup?email=a@x.com&email=b@x.com").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_email_params_require() {
        let params = EmailParams {
            email: Some("a@x.com".to_string()),
        };
        assert_eq!(params.require().unwrap(), "a@x.com");
    }

    #[test]
    fn test_email_params_missing() {
        let err = EmailParams::default().require().unwrap_err();
        assert!(matches!(err, Error::MissingParameter { name: "email" }));
    }

    #[test]
    fn test_auth_status_shape() {
        let status = AuthStatus {
            authenticated: true,
            teacher: "Mr. Chen".to_string(),
            username: "mchen".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["teacher"], "Mr. Chen");
        assert_eq!(json["username"], "mchen");
    }
}

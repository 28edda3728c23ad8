//! Session endpoints: login, registration, logout and the current profile.

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Public. Starts a session.
pub const LOGIN_PATH: &str = "/login";
/// Public. Creates an account.
pub const REGISTER_PATH: &str = "/register";
/// Protected. Ends the session.
pub const LOGOUT_PATH: &str = "/v1/logout";
/// Public. Returns the current user.
pub const PROFILE_PATH: &str = "/api/profile";

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id
    pub id: i64,
    /// Display name
    pub username: String,
    /// Login email
    pub email: String,
}

#[derive(Deserialize)]
struct ProfileResponse {
    user: User,
}

/// Credentials for [`AuthApi::login`].
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    /// Account email
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    /// Account password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Registration form for [`AuthApi::signup`].
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    /// Account email
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    /// Chosen password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Must equal `password`
    #[serde(rename = "repeatedPassword")]
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub repeated_password: String,
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn logged<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::error!(operation = op, error = %e, "auth request failed");
    }
    result
}

/// Authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Wrap a client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Start a session. Any token the server returns is picked up by the
    /// client's CSRF layer.
    pub async fn login(&self, email: impl Into<String>, password: impl Into<String>) -> Result<()> {
        let body = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        logged("login", self.login_with(&body).await)
    }

    async fn login_with(&self, body: &LoginRequest) -> Result<()> {
        body.validate()?;
        self.client
            .post(LOGIN_PATH, body)
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Create an account.
    pub async fn signup(&self, form: &SignupRequest) -> Result<()> {
        logged("register", self.signup_inner(form).await)
    }

    async fn signup_inner(&self, form: &SignupRequest) -> Result<()> {
        form.validate()?;
        self.client
            .post(REGISTER_PATH, form)
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// End the session.
    pub async fn logout(&self) -> Result<()> {
        let result = async {
            self.client
                .send(Method::POST, LOGOUT_PATH)
                .await?
                .error_for_status()?;
            Ok::<_, ClientError>(())
        }
        .await;
        logged("logout", result)
    }

    /// Fetch the signed-in user.
    pub async fn profile(&self) -> Result<User> {
        let result = async {
            let resp = self.client.get(PROFILE_PATH).await?.error_for_status()?;
            let body: ProfileResponse = resp.json()?;
            Ok::<_, ClientError>(body.user)
        }
        .await;
        logged("profile", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "hunter22".into(),
            repeated_password: "hunter22".into(),
        }
    }

    #[test]
    fn test_signup_serializes_camel_case_repeat() {
        let value = serde_json::to_value(signup()).unwrap();
        assert_eq!(value["repeatedPassword"], "hunter22");
        assert!(value.get("repeated_password").is_none());
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup().validate().is_ok());

        let mut form = signup();
        form.repeated_password = "different".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("repeated_password"));

        let mut form = signup();
        form.email = "not-an-email".into();
        assert!(form.validate().unwrap_err().field_errors().contains_key("email"));

        let mut form = signup();
        form.username = "   ".into();
        assert!(form.validate().unwrap_err().field_errors().contains_key("username"));
    }

    #[test]
    fn test_login_validation() {
        let ok = LoginRequest {
            email: "a@b.co".into(),
            password: "x".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "a@b.co".into(),
            password: String::new(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_profile_envelope() {
        let body: ProfileResponse =
            serde_json::from_str(r#"{"user":{"id":1,"username":"ada","email":"ada@example.com"}}"#)
                .unwrap();
        assert_eq!(body.user.username, "ada");
    }
}

//! Request/response DTOs.
//!
//! Request bodies keep every field optional so that a missing field reaches the route schema
//! (or, in the simplified profile, the handler) instead of failing deserialization.

use serde::{Deserialize, Serialize};

use mesto_core::{FieldChecks, SchemaError, User, card, messages, schema, user};

use crate::app::validation::Schema;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateAvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCardRequest {
    pub name: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn email_and_password(checks: &mut FieldChecks, email: Option<&str>, password: Option<&str>) {
    checks
        .field("email", email)
        .required(messages::required("email"))
        .check(schema::is_email, messages::INVALID_EMAIL);
    checks
        .field("password", password)
        .required(messages::required("password"))
        .min_chars(user::PASSWORD_MIN, messages::PASSWORD_TOO_SHORT);
}

fn person_name(checks: &mut FieldChecks, value: Option<&str>, required: bool) {
    let mut field = checks.field("name", value);
    if required {
        field = field.required(messages::required("name"));
    }
    field
        .min_chars(user::NAME_MIN, messages::min_length("name", user::NAME_MIN))
        .max_chars(user::NAME_MAX, messages::max_length("name", user::NAME_MAX))
        .matches(&schema::PERSON_NAME, messages::INVALID_NAME);
}

fn about(checks: &mut FieldChecks, value: Option<&str>, required: bool) {
    let mut field = checks.field("about", value);
    if required {
        field = field.required(messages::required("about"));
    }
    field
        .min_chars(user::ABOUT_MIN, messages::min_length("about", user::ABOUT_MIN))
        .max_chars(user::ABOUT_MAX, messages::max_length("about", user::ABOUT_MAX));
}

fn avatar(checks: &mut FieldChecks, value: Option<&str>, required: bool) {
    let mut field = checks.field("avatar", value);
    if required {
        field = field.required(messages::required("avatar"));
    }
    field.check(schema::is_url, messages::INVALID_AVATAR_URL);
}

impl Schema for SignInRequest {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        email_and_password(&mut checks, self.email.as_deref(), self.password.as_deref());
        checks.finish()
    }
}

impl Schema for SignUpRequest {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        person_name(&mut checks, self.name.as_deref(), false);
        about(&mut checks, self.about.as_deref(), false);
        avatar(&mut checks, self.avatar.as_deref(), false);
        email_and_password(&mut checks, self.email.as_deref(), self.password.as_deref());
        checks.finish()
    }
}

impl Schema for UpdateProfileRequest {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        person_name(&mut checks, self.name.as_deref(), true);
        about(&mut checks, self.about.as_deref(), true);
        checks.finish()
    }
}

impl Schema for UpdateAvatarRequest {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        avatar(&mut checks, self.avatar.as_deref(), true);
        checks.finish()
    }
}

impl Schema for CreateCardRequest {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        checks
            .field("name", self.name.as_deref())
            .required(messages::required("name"))
            .min_chars(card::NAME_MIN, messages::min_length("name", card::NAME_MIN))
            .max_chars(card::NAME_MAX, messages::max_length("name", card::NAME_MAX))
            .matches(&schema::CARD_NAME, messages::INVALID_CARD_NAME);
        checks
            .field("link", self.link.as_deref())
            .required(messages::required("link"))
            .check(schema::is_url, messages::INVALID_IMAGE_URL);
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: SchemaError) -> Vec<&'static str> {
        err.fields().iter().map(|f| f.field).collect()
    }

    #[test]
    fn signin_requires_email_and_password() {
        let err = SignInRequest::default().validate().unwrap_err();
        assert_eq!(fields(err), vec!["email", "password"]);

        let short = SignInRequest {
            email: Some("a@example.com".into()),
            password: Some("12345".into()),
        };
        assert_eq!(
            short.validate().unwrap_err().messages(),
            vec![messages::PASSWORD_TOO_SHORT.to_string()]
        );
    }

    #[test]
    fn signup_profile_fields_are_optional_but_checked() {
        let minimal = SignUpRequest {
            email: Some("a@example.com".into()),
            password: Some("s3cret-pass".into()),
            ..Default::default()
        };
        assert!(minimal.validate().is_ok());

        let bad = SignUpRequest {
            name: Some("R2D2".into()),
            avatar: Some("not a url".into()),
            ..minimal
        };
        assert_eq!(
            bad.validate().unwrap_err().messages(),
            vec![
                messages::INVALID_NAME.to_string(),
                messages::INVALID_AVATAR_URL.to_string()
            ]
        );
    }

    #[test]
    fn profile_update_requires_both_fields() {
        let err = UpdateProfileRequest {
            name: Some("Анна".into()),
            about: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(fields(err), vec!["about"]);
    }

    #[test]
    fn card_name_length_counts_characters() {
        let card = CreateCardRequest {
            name: Some("Мост".repeat(7)),
            link: Some("https://example.com/a.png".into()),
        };
        assert!(card.validate().is_ok());

        let too_long = CreateCardRequest {
            name: Some("Мост".repeat(8)),
            ..card
        };
        assert_eq!(
            too_long.validate().unwrap_err().messages(),
            vec![messages::max_length("name", card::NAME_MAX)]
        );
    }
}

//! User profiles.
//!
//! The password hash is deliberately not part of [`User`]: a `User` is what clients see,
//! [`Credentials`] is what the login path sees.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::id::UserId;
use crate::messages;
use crate::schema::{self, FieldChecks};

pub const DEFAULT_NAME: &str = "Жак-Ив Кусто";
pub const DEFAULT_ABOUT: &str = "Исследователь";
pub const DEFAULT_AVATAR: &str =
    "https://pictures.s3.yandex.net/resources/jacques-cousteau_1604399756.png";

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 30;
pub const ABOUT_MIN: usize = 2;
pub const ABOUT_MAX: usize = 200;
pub const PASSWORD_MIN: usize = 6;

/// Public user representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
}

impl User {
    /// Model-level schema, enforced by every store on insert and update.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        checks
            .field("name", Some(self.name.as_str()))
            .required(messages::required("name"))
            .min_chars(NAME_MIN, messages::min_length("name", NAME_MIN))
            .max_chars(NAME_MAX, messages::max_length("name", NAME_MAX))
            .matches(
                &schema::PERSON_NAME,
                "Поле \"name\" может содержать только буквы, пробелы и дефисы",
            );
        checks
            .field("about", Some(self.about.as_str()))
            .required(messages::required("about"))
            .min_chars(ABOUT_MIN, messages::min_length("about", ABOUT_MIN))
            .max_chars(ABOUT_MAX, messages::max_length("about", ABOUT_MAX));
        checks
            .field("avatar", Some(self.avatar.as_str()))
            .required(messages::required("avatar"))
            .check(schema::is_url, messages::INVALID_AVATAR_URL);
        checks
            .field("email", Some(self.email.as_str()))
            .required(messages::required("email"))
            .check(schema::is_email, messages::INVALID_EMAIL);
        checks.finish()
    }

    /// Copy of this user with `patch` applied, re-validated.
    pub fn patched(&self, patch: &UserPatch) -> Result<User, SchemaError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(about) = &patch.about {
            next.about = about.clone();
        }
        if let Some(avatar) = &patch.avatar {
            next.avatar = avatar.clone();
        }
        next.validate()?;
        Ok(next)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            about: self.about.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// A user together with its stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// Signup payload after hashing; profile fields fall back to defaults when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Assign `id`, fill defaults and run the model schema.
    pub fn into_credentials(self, id: UserId) -> Result<Credentials, SchemaError> {
        let user = User {
            id,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            about: self.about.unwrap_or_else(|| DEFAULT_ABOUT.to_string()),
            avatar: self.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            email: self.email,
        };

        let mut errors = SchemaError::new();
        if let Err(e) = user.validate() {
            errors.extend(e);
        }
        if self.password_hash.is_empty() {
            errors.push("password", messages::required("password"));
        }
        errors.into_result()?;

        Ok(Credentials {
            user,
            password_hash: self.password_hash,
        })
    }
}

/// Self-service profile change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
}

impl UserPatch {
    pub fn profile(name: Option<String>, about: Option<String>) -> Self {
        Self {
            name,
            about,
            avatar: None,
        }
    }

    pub fn avatar(avatar: Option<String>) -> Self {
        Self {
            avatar,
            ..Self::default()
        }
    }
}

/// The profile fields a card exposes for its owner and likers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub about: String,
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: None,
            about: None,
            avatar: None,
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[test]
    fn defaults_fill_missing_profile_fields() {
        let creds = new_user("jacques@example.com")
            .into_credentials(UserId::new())
            .unwrap();
        assert_eq!(creds.user.name, DEFAULT_NAME);
        assert_eq!(creds.user.about, DEFAULT_ABOUT);
        assert_eq!(creds.user.avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn schema_failures_are_aggregated() {
        let mut input = new_user("not-an-email");
        input.name = Some("X".into());
        input.password_hash = String::new();

        let err = input.into_credentials(UserId::new()).unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                messages::min_length("name", 2),
                messages::INVALID_EMAIL.to_string(),
                messages::required("password"),
            ]
        );
    }

    #[test]
    fn serialized_user_has_no_password_and_uses_underscore_id() {
        let creds = new_user("jacques@example.com")
            .into_credentials(UserId::new())
            .unwrap();
        let json = serde_json::to_value(&creds.user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["_id"], creds.user.id.to_string());
        assert_eq!(json["email"], "jacques@example.com");
    }

    #[test]
    fn patch_touches_only_supplied_fields() {
        let user = new_user("jacques@example.com")
            .into_credentials(UserId::new())
            .unwrap()
            .user;

        let patched = user
            .patched(&UserPatch::profile(Some("Анна".into()), None))
            .unwrap();
        assert_eq!(patched.name, "Анна");
        assert_eq!(patched.about, DEFAULT_ABOUT);
        assert_eq!(patched.avatar, user.avatar);

        let err = user
            .patched(&UserPatch::avatar(Some("not a url".into())))
            .unwrap_err();
        assert_eq!(err.messages(), vec![messages::INVALID_AVATAR_URL]);
    }
}

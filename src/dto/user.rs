use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// DTO for creating an account via the API
#[derive(Deserialize, Display, Validate, ToSchema, Debug, Default)]
#[display("{}", email.as_deref().unwrap_or("<no email>"))]
#[cfg_attr(test, derive(Serialize))]
pub struct RegisterUser {
    #[validate(required, email(message = "email must be a valid email address"))]
    #[schema(example = "someone@example.com")]
    pub email: Option<String>,
    #[validate(required, length(min = 1, message = "password must not be empty"))]
    #[schema(example = "hunter22")]
    pub password: Option<String>,
    #[validate(
        required,
        length(min = 1, max = 100, message = "name must be between 1 and 100 characters")
    )]
    #[schema(example = "Someone")]
    pub name: Option<String>,
}

impl TryFrom<RegisterUser> for domain::user::NewUser {
    type Error = ValidationErrors;

    fn try_from(value: RegisterUser) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(domain::user::NewUser {
            email: value.email.unwrap_or_default().trim().to_owned(),
            name: value.name.unwrap_or_default(),
            password: value.password.unwrap_or_default(),
        })
    }
}

/// DTO for logging in via the API
#[derive(Deserialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Serialize))]
pub struct LogIn {
    #[serde(default)]
    #[schema(example = "demo@demo.io")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "demo123")]
    pub password: String,
}

/// The public face of an account
#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct UserProfile {
    pub id: String,
    #[schema(example = "someone@example.com")]
    pub email: String,
    #[schema(example = "Someone")]
    pub name: String,
}

impl From<domain::user::User> for UserProfile {
    fn from(value: domain::user::User) -> Self {
        UserProfile {
            id: value.id,
            email: value.email,
            name: value.name,
        }
    }
}

/// Returned by registration and login
#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct AuthSession {
    /// Send back as `Authorization: Bearer <token>`
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_requires_every_field() {
        let validation_result = RegisterUser::default().validate();

        let Err(validation_errors) = validation_result else {
            panic!("Expected validation to fail");
        };
        let field_errors = validation_errors.field_errors();
        assert!(field_errors.contains_key("email"));
        assert!(field_errors.contains_key("password"));
        assert!(field_errors.contains_key("name"));
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let bad_user = RegisterUser {
            email: Some("not-an-email".into()),
            password: Some("hunter22".into()),
            name: Some("Someone".into()),
        };

        let Err(validation_errors) = domain::user::NewUser::try_from(bad_user) else {
            panic!("Expected conversion to fail");
        };
        assert!(validation_errors.field_errors().contains_key("email"));
    }

    #[test]
    fn displays_as_email_for_logs() {
        let user = RegisterUser {
            email: Some("someone@example.com".into()),
            ..RegisterUser::default()
        };

        assert_eq!("someone@example.com", user.to_string());
        assert_eq!("<no email>", RegisterUser::default().to_string());
    }
}

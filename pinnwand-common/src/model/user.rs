use crate::model::Id;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A user as returned to clients. The password hash stays in the database
/// layer and is never part of this type.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub name: String,
    pub email: String,
}

/// Payload for `POST /users`. Email uniqueness is enforced by the database
/// at write time, not here.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(
        min = 3,
        max = 15,
        message = "name must be between 3 and 15 characters"
    ))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 1, message = "password must not be empty"),
        must_match(
            other = password_confirmation,
            message = "password confirmation does not match"
        )
    )]
    pub password: String,
    pub password_confirmation: String,
}

/// Payload for `PUT /users/{id}`. Absent fields keep their stored value; a
/// provided password still requires a matching confirmation.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Validate)]
#[validate(schema(function = validate_password_confirmation))]
pub struct UpdateUser {
    #[validate(length(
        min = 3,
        max = 15,
        message = "name must be between 3 and 15 characters"
    ))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

fn validate_password_confirmation(user: &UpdateUser) -> Result<(), ValidationError> {
    if user.password != user.password_confirmation {
        let mut error = ValidationError::new("must_match");
        error.message = Some("password confirmation does not match".into());
        return Err(error);
    }
    Ok(())
}

use crate::model::Id;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    pub description: String,
}

/// Payload for `POST /posts`. Title uniqueness is enforced by the database
/// at write time, not here.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(length(
        min = 5,
        max = 50,
        message = "title must be between 5 and 50 characters"
    ))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 100,
        message = "description must be between 10 and 100 characters"
    ))]
    pub description: String,
}

/// Payload for `PUT /posts/{id}`. Absent fields keep their stored value.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Validate)]
pub struct UpdatePost {
    #[validate(length(
        min = 5,
        max = 50,
        message = "title must be between 5 and 50 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        max = 100,
        message = "description must be between 10 and 100 characters"
    ))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::model::post::{CreatePost, UpdatePost};
    use validator::Validate;

    fn create(title: &str, description: &str) -> CreatePost {
        CreatePost {
            title: title.to_owned(),
            description: description.to_owned(),
        }
    }

    #[test]
    fn valid_create_post() {
        assert!(
            create("Valid Title", "This is a long enough description")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn title_length_bounds() {
        assert!(create("Tiny", "This is a long enough description")
            .validate()
            .is_err());
        assert!(create(&"t".repeat(51), "This is a long enough description")
            .validate()
            .is_err());
        assert!(create(&"t".repeat(5), "This is a long enough description")
            .validate()
            .is_ok());
        assert!(create(&"t".repeat(50), "This is a long enough description")
            .validate()
            .is_ok());
    }

    #[test]
    fn description_length_bounds() {
        assert!(create("Valid Title", "too short").validate().is_err());
        assert!(create("Valid Title", &"d".repeat(101)).validate().is_err());
        assert!(create("Valid Title", &"d".repeat(10)).validate().is_ok());
        assert!(create("Valid Title", &"d".repeat(100)).validate().is_ok());
    }

    #[test]
    fn validation_error_carries_field_and_message() {
        let errors = create("Tiny", "This is a long enough description")
            .validate()
            .unwrap_err();
        let field_errors = errors.field_errors();
        let title_errors = field_errors.get("title").unwrap();
        assert_eq!(
            title_errors[0].message.as_deref(),
            Some("title must be between 5 and 50 characters")
        );
    }

    #[test]
    fn update_post_validates_only_present_fields() {
        let empty = UpdatePost {
            title: None,
            description: None,
        };
        assert!(empty.validate().is_ok());

        let title_only = UpdatePost {
            title: Some("New Valid Title".to_owned()),
            description: None,
        };
        assert!(title_only.validate().is_ok());

        let bad_title = UpdatePost {
            title: Some("Tiny".to_owned()),
            description: None,
        };
        assert!(bad_title.validate().is_err());
    }
}

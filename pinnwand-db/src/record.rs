use pinnwand_common::model::{post::Post, user::User};
use sqlx::FromRow;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
}

// The password hash column is never selected; it stays in the database.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Self {
            id: value.id.into(),
            title: value.title,
            description: value.description,
        }
    }
}

impl From<UserRecord> for User {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
        }
    }
}

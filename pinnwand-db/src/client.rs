use crate::record::{PostRecord, UserRecord};
use pinnwand_common::model::{
    Id,
    post::{CreatePost, Post, PostMarker, UpdatePost},
    user::{CreateUser, UpdateUser, User, UserMarker},
};
use pinnwand_common::password::{self, PasswordHashError};
use sqlx::{PgPool, query, query_as};
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("A post with this title already exists")]
    DuplicateTitle,
    #[error("A user with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Translates a unique-constraint violation on `constraint` into `duplicate`,
/// passing every other error through.
fn unique_violation(error: sqlx::Error, constraint: &str, duplicate: DbError) -> DbError {
    match &error {
        sqlx::Error::Database(db_error)
            if db_error.is_unique_violation() && db_error.constraint() == Some(constraint) =>
        {
            duplicate
        }
        _ => DbError::Sqlx(error),
    }
}

// COALESCE keeps the stored value for every absent update field, so a
// subsequent fetch reflects exactly the fields the update provided.
const UPDATE_POST_SQL: &str = "
    UPDATE posts
    SET title = COALESCE($2, title),
        description = COALESCE($3, description)
    WHERE id = $1
    RETURNING id, title, description
    ";

const UPDATE_USER_SQL: &str = "
    UPDATE users
    SET name = COALESCE($2, name),
        email = COALESCE($3, email),
        password_hash = COALESCE($4, password_hash)
    WHERE id = $1
    RETURNING id, name, email
    ";

#[derive(Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let records: Vec<PostRecord> = query_as(
            "
            SELECT id, title, description
            FROM posts
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Post::from).collect())
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record: Option<PostRecord> = query_as(
            "
            SELECT id, title, description
            FROM posts
            WHERE id = $1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Post::from))
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        let record: PostRecord = query_as(
            "
            INSERT INTO posts (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description
            ",
        )
        .bind(&post.title)
        .bind(&post.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| unique_violation(error, "posts_title_key", DbError::DuplicateTitle))?;

        Ok(record.into())
    }

    /// Applies the provided fields to the post, keeping stored values for
    /// absent ones. Returns `None` if no post has this id.
    pub async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        update: &UpdatePost,
    ) -> Result<Option<Post>> {
        let record: Option<PostRecord> = query_as(UPDATE_POST_SQL)
            .bind(post_id.get())
            .bind(update.title.as_deref())
            .bind(update.description.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                unique_violation(error, "posts_title_key", DbError::DuplicateTitle)
            })?;

        Ok(record.map(Post::from))
    }

    /// Returns whether a post was actually deleted.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts WHERE id = $1")
            .bind(post_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let records: Vec<UserRecord> = query_as(
            "
            SELECT id, name, email
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(User::from).collect())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record: Option<UserRecord> = query_as(
            "
            SELECT id, name, email
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    pub async fn create_user(&self, user: &CreateUser) -> Result<User> {
        let password_hash = password::hash_password(&user.password)?;

        let record: UserRecord = query_as(
            "
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email
            ",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| unique_violation(error, "users_email_key", DbError::DuplicateEmail))?;

        Ok(record.into())
    }

    /// Applies the provided fields to the user, hashing a new password when
    /// one is given. Returns `None` if no user has this id.
    pub async fn update_user(
        &self,
        user_id: Id<UserMarker>,
        update: &UpdateUser,
    ) -> Result<Option<User>> {
        let password_hash = update
            .password
            .as_deref()
            .map(password::hash_password)
            .transpose()?;

        let record: Option<UserRecord> = query_as(UPDATE_USER_SQL)
            .bind(user_id.get())
            .bind(update.name.as_deref())
            .bind(update.email.as_deref())
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                unique_violation(error, "users_email_key", DbError::DuplicateEmail)
            })?;

        Ok(record.map(User::from))
    }

    /// Returns whether a user was actually deleted.
    pub async fn delete_user(&self, user_id: Id<UserMarker>) -> Result<bool> {
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(user_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// The full create/show/update/delete round trip runs against a live
// Postgres; what is checkable here is the merge contract the round trip
// relies on: every updatable column falls back to its stored value when the
// bound parameter is NULL, so absent fields survive an update unchanged.
#[cfg(test)]
mod tests {
    use crate::client::{UPDATE_POST_SQL, UPDATE_USER_SQL};

    #[test]
    fn post_update_keeps_absent_fields() {
        assert!(UPDATE_POST_SQL.contains("title = COALESCE($2, title)"));
        assert!(UPDATE_POST_SQL.contains("description = COALESCE($3, description)"));
        assert!(UPDATE_POST_SQL.contains("RETURNING id, title, description"));
    }

    #[test]
    fn user_update_keeps_absent_fields_and_returns_no_hash() {
        assert!(UPDATE_USER_SQL.contains("name = COALESCE($2, name)"));
        assert!(UPDATE_USER_SQL.contains("email = COALESCE($3, email)"));
        assert!(UPDATE_USER_SQL.contains("password_hash = COALESCE($4, password_hash)"));
        assert!(UPDATE_USER_SQL.contains("RETURNING id, name, email\n"));
    }
}

use crate::server::{Json, MessageResponse, Result, ServerError, ServerRouter};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use pinnwand_common::model::{
    Id,
    user::{CreateUser, UpdateUser, User, UserMarker},
};
use pinnwand_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_users)
        .typed_post(create_user)
        .typed_get(get_user)
        .typed_put(update_user)
        .typed_delete(delete_user)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users", rejection(ServerError))]
struct UsersPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct UserPath {
    id: Id<UserMarker>,
}

async fn list_users(
    UsersPath(): UsersPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<User>>> {
    let users = db.list_users().await?;

    Ok(Json(users))
}

async fn create_user(
    UsersPath(): UsersPath,
    State(db): State<Arc<DbClient>>,
    Json(create): Json<CreateUser>,
) -> Result<Json<User>> {
    create.validate()?;

    let user = db.create_user(&create).await?;

    Ok(Json(user))
}

async fn get_user(
    UserPath { id }: UserPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<User>> {
    let user = db
        .fetch_user(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(user))
}

async fn update_user(
    UserPath { id }: UserPath,
    State(db): State<Arc<DbClient>>,
    Json(update): Json<UpdateUser>,
) -> Result<Json<User>> {
    update.validate()?;

    let user = db
        .update_user(id, &update)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(user))
}

async fn delete_user(
    UserPath { id }: UserPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<MessageResponse>> {
    if !db.delete_user(id).await? {
        return Err(ServerError::UserByIdNotFound(id));
    }

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_owned(),
    }))
}

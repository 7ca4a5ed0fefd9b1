use crate::server::{Json, MessageResponse, Result, ServerError, ServerRouter};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use pinnwand_common::model::{
    Id,
    post::{CreatePost, Post, PostMarker, UpdatePost},
};
use pinnwand_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn list_posts(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<Post>>> {
    let posts = db.list_posts().await?;

    Ok(Json(posts))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
    Json(create): Json<CreatePost>,
) -> Result<Json<Post>> {
    create.validate()?;

    let post = db.create_post(&create).await?;

    Ok(Json(post))
}

async fn get_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Post>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn update_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    Json(update): Json<UpdatePost>,
) -> Result<Json<Post>> {
    update.validate()?;

    let post = db
        .update_post(id, &update)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<MessageResponse>> {
    if !db.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Json(MessageResponse {
        message: "Post deleted successfully".to_owned(),
    }))
}

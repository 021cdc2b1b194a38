use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AdminUser,
    json::Json,
    routes::MessageResponse,
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use schreibwerk_common::model::{
    Id,
    post::{PostDetails, PostMarker, PostOverview},
    user::{User, UserMarker},
};
use schreibwerk_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(list_users)
        .typed_post(block_user)
        .typed_post(unblock_user)
        .typed_get(list_all_posts)
        .typed_get(get_post_details)
        .typed_post(disable_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/users")]
struct AdminUsersPath;

async fn list_users(
    _: AdminUsersPath,
    State(db): State<Arc<DbClient>>,
    _: AdminUser,
) -> Result<Json<Vec<User>>> {
    let users = db.list_users().await?;

    Ok(Json(users))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/block/{user_id}", rejection(ServerError))]
struct BlockUserPath {
    user_id: Id<UserMarker>,
}

async fn block_user(
    BlockUserPath { user_id }: BlockUserPath,
    State(db): State<Arc<DbClient>>,
    _: AdminUser,
) -> Result<Json<MessageResponse>> {
    if !db.set_user_blocked(user_id, true).await? {
        return Err(ServerError::UserByIdNotFound(user_id));
    }

    Ok(Json(MessageResponse::new("User blocked successfully.")))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/unblock/{user_id}", rejection(ServerError))]
struct UnblockUserPath {
    user_id: Id<UserMarker>,
}

async fn unblock_user(
    UnblockUserPath { user_id }: UnblockUserPath,
    State(db): State<Arc<DbClient>>,
    _: AdminUser,
) -> Result<Json<MessageResponse>> {
    if !db.set_user_blocked(user_id, false).await? {
        return Err(ServerError::UserByIdNotFound(user_id));
    }

    Ok(Json(MessageResponse::new("User unblocked successfully.")))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/all-posts")]
struct AllPostsPath;

async fn list_all_posts(
    _: AllPostsPath,
    State(db): State<Arc<DbClient>>,
    _: AdminUser,
) -> Result<Json<Vec<PostOverview>>> {
    let posts = db.list_all_posts().await?;

    Ok(Json(posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/post/{post_id}", rejection(ServerError))]
struct AdminPostPath {
    post_id: Id<PostMarker>,
}

async fn get_post_details(
    AdminPostPath { post_id }: AdminPostPath,
    State(db): State<Arc<DbClient>>,
    _: AdminUser,
) -> Result<Json<PostDetails>> {
    let details = db
        .fetch_post_details(post_id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(post_id))?;

    Ok(Json(details))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/disable-post/{post_id}", rejection(ServerError))]
struct DisablePostPath {
    post_id: Id<PostMarker>,
}

async fn disable_post(
    DisablePostPath { post_id }: DisablePostPath,
    State(db): State<Arc<DbClient>>,
    _: AdminUser,
) -> Result<Json<MessageResponse>> {
    if !db.set_post_disabled(post_id).await? {
        return Err(ServerError::PostByIdNotFound(post_id));
    }

    Ok(Json(MessageResponse::new("Post disabled successfully.")))
}

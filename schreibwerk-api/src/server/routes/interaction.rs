use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    json::Json,
    routes::MessageResponse,
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use schreibwerk_common::model::{
    Id,
    post::Post,
    user::{User, UserMarker},
};
use schreibwerk_db::client::{DbClient, FollowChange};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(follow)
        .typed_post(unfollow)
        .typed_get(view_profile)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/interaction/profile/follow/{user_id}", rejection(ServerError))]
struct FollowPath {
    user_id: Id<UserMarker>,
}

async fn follow(
    FollowPath { user_id }: FollowPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<MessageResponse>> {
    let user = user.into_user();
    if user.id == user_id {
        return Err(ServerError::SelfInteraction);
    }

    let notification_text = format!("{} started following you.", user.username);
    match db.create_follow(user.id, user_id, &notification_text).await? {
        FollowChange::TargetNotFound => Err(ServerError::UserByIdNotFound(user_id)),
        FollowChange::AlreadyInEffect => Err(ServerError::AlreadyFollowing(user_id)),
        FollowChange::Applied => Ok(Json(MessageResponse::new(
            "Successfully followed the blogger.",
        ))),
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/interaction/profile/unfollow/{user_id}", rejection(ServerError))]
struct UnfollowPath {
    user_id: Id<UserMarker>,
}

async fn unfollow(
    UnfollowPath { user_id }: UnfollowPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<MessageResponse>> {
    let user = user.into_user();
    if user.id == user_id {
        return Err(ServerError::SelfInteraction);
    }

    match db.delete_follow(user.id, user_id).await? {
        FollowChange::TargetNotFound => Err(ServerError::UserByIdNotFound(user_id)),
        FollowChange::AlreadyInEffect => Err(ServerError::NotFollowed(user_id)),
        FollowChange::Applied => Ok(Json(MessageResponse::new(
            "Successfully unfollowed the blogger.",
        ))),
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/interaction/profile/{user_id}", rejection(ServerError))]
struct ViewProfilePath {
    user_id: Id<UserMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct ViewProfileResponse {
    user: User,
    posts: Vec<Post>,
}

/// A profile (with posts) is only visible to the user's followers.
async fn view_profile(
    ViewProfilePath { user_id }: ViewProfilePath,
    State(db): State<Arc<DbClient>>,
    viewer: AuthenticatedUser,
) -> Result<Json<ViewProfileResponse>> {
    let target = db
        .fetch_user(user_id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(user_id))?;

    if !db.is_following(viewer.into_user().id, user_id).await? {
        return Err(ServerError::ProfileAccessDenied);
    }

    let posts = db.fetch_posts_by_author(user_id).await?;

    Ok(Json(ViewProfileResponse {
        user: target,
        posts,
    }))
}

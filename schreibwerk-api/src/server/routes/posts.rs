use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    json::Json,
    routes::MessageResponse,
};
use axum::{Router, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::routing::{RouterExt, TypedPath};
use schreibwerk_common::model::{
    Id,
    post::{Comment, CreatePost, FullPost, Post, PostMarker, RatingValue},
};
use schreibwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(create_post)
        .typed_get(list_own_posts)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
        .typed_post(comment_post)
        .typed_post(rate_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/create")]
struct CreatePostPath;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct CreatePostResponse {
    message: &'static str,
    post_id: Id<PostMarker>,
}

async fn create_post(
    _: CreatePostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePost>,
) -> Result<impl IntoResponse> {
    let post_id = db.create_post(user.into_user().id, &request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            message: "Blog post created successfully.",
            post_id,
        }),
    ))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post")]
struct OwnPostsPath;

async fn list_own_posts(
    _: OwnPostsPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Post>>> {
    let posts = db.fetch_posts_by_author(user.into_user().id).await?;

    Ok(Json(posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/{post_id}", rejection(ServerError))]
struct PostPath {
    post_id: Id<PostMarker>,
}

async fn get_post(
    PostPath { post_id }: PostPath,
    State(db): State<Arc<DbClient>>,
    _: AuthenticatedUser,
) -> Result<Json<FullPost>> {
    let post = db
        .fetch_full_post(post_id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(post_id))?;

    Ok(Json(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/update/{post_id}", rejection(ServerError))]
struct UpdatePostPath {
    post_id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct UpdatePostRequest {
    title: String,
}

/// Only the title is mutable; everything else is fixed at creation.
async fn update_post(
    UpdatePostPath { post_id }: UpdatePostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<MessageResponse>> {
    let updated = db
        .update_post_title(user.into_user().id, post_id, &request.title)
        .await?;

    if !updated {
        return Err(ServerError::PostByIdNotFound(post_id));
    }

    Ok(Json(MessageResponse::new("Post updated successfully.")))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/delete/{post_id}", rejection(ServerError))]
struct DeletePostPath {
    post_id: Id<PostMarker>,
}

async fn delete_post(
    DeletePostPath { post_id }: DeletePostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<MessageResponse>> {
    let deleted = db.delete_post(user.into_user().id, post_id).await?;

    if !deleted {
        return Err(ServerError::PostByIdNotFound(post_id));
    }

    Ok(Json(MessageResponse::new("Post deleted successfully.")))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/comment/{post_id}", rejection(ServerError))]
struct CommentPostPath {
    post_id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct CommentRequest {
    text: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct CommentResponse {
    message: &'static str,
    comment: Comment,
}

async fn comment_post(
    CommentPostPath { post_id }: CommentPostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentResponse>> {
    let user = user.into_user();
    let post = db
        .fetch_post(post_id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(post_id))?;

    let notification_text = format!(
        "{} commented on your post: \"{}\".",
        user.username, post.title
    );
    let comment = db
        .add_comment(&post, user.id, &request.text, &notification_text)
        .await?;

    Ok(Json(CommentResponse {
        message: "Comment added successfully.",
        comment,
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post/rate/{post_id}", rejection(ServerError))]
struct RatePostPath {
    post_id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct RateRequest {
    /// Absent means one star.
    value: Option<RatingValue>,
}

async fn rate_post(
    RatePostPath { post_id }: RatePostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(request): Json<RateRequest>,
) -> Result<Json<MessageResponse>> {
    let user = user.into_user();
    let value = request.value.unwrap_or_default();

    let post = db
        .fetch_post(post_id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(post_id))?;

    let notification_text = format!(
        "{} rated your post: {} with {} stars.",
        user.username,
        post.title,
        value.get()
    );
    let added = db
        .add_rating(&post, user.id, value, &notification_text)
        .await?;

    if !added {
        return Err(ServerError::AlreadyRated(post_id));
    }

    Ok(Json(MessageResponse::new("Rating added successfully.")))
}

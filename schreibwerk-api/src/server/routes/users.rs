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
    auth::{AuthToken, HashedPassword, TokenSigner},
    post::Post,
    user::{Email, Profile, RegisterUser, Role, User, UserMarker, Username},
};
use schreibwerk_db::client::{DbClient, UserUpdate, UserUpdateOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(register)
        .typed_post(login)
        .typed_get(get_own_profile)
        .typed_put(update_own_profile)
        .typed_put(update_own_profile_alias)
        .typed_get(get_user)
        .typed_get(get_user_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/register")]
struct RegisterPath;

async fn register(
    _: RegisterPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<RegisterUser>,
) -> Result<impl IntoResponse> {
    let password_hash = HashedPassword::hash(&request.password)?;

    let created = db
        .create_user(&request.username, &request.email, &password_hash)
        .await?;

    if created.is_none() {
        return Err(ServerError::EmailTaken);
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully.")),
    ))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/login")]
struct LoginPath;

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct LoginRequest {
    email: Email,
    password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct LoginUser {
    id: Id<UserMarker>,
    username: Username,
    roles: Vec<Role>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct LoginResponse {
    token: AuthToken,
    user: LoginUser,
}

async fn login(
    _: LoginPath,
    State(db): State<Arc<DbClient>>,
    State(signer): State<TokenSigner>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, password_hash) = db
        .fetch_credentials(&request.email)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    if !password_hash.verify(&request.password)? {
        return Err(ServerError::InvalidCredentials);
    }

    let token = signer.issue(user.id).map_err(ServerError::TokenIssue)?;

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            username: user.username,
            roles: user.roles,
        },
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/profile")]
struct OwnProfilePath;

async fn get_own_profile(
    _: OwnProfilePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<Profile>> {
    let user = user.into_user();
    let profile = db
        .fetch_profile(user.id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(user.id))?;

    Ok(Json(profile))
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct UpdateProfileRequest {
    username: Option<Username>,
    email: Option<Email>,
    password: Option<String>,
}

async fn update_own_profile(
    _: OwnProfilePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>> {
    apply_profile_update(&db, &user.into_user(), request).await
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/update")]
struct UpdateProfilePath;

/// Legacy alias for `PUT /user/profile`.
async fn update_own_profile_alias(
    _: UpdateProfilePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>> {
    apply_profile_update(&db, &user.into_user(), request).await
}

async fn apply_profile_update(
    db: &DbClient,
    user: &User,
    request: UpdateProfileRequest,
) -> Result<Json<MessageResponse>> {
    if let Some(email) = &request.email
        && email != &user.email
        && db.fetch_credentials(email).await?.is_some()
    {
        return Err(ServerError::EmailTaken);
    }

    let password_hash = request
        .password
        .as_deref()
        .map(HashedPassword::hash)
        .transpose()?;

    let update = UserUpdate {
        username: request.username,
        email: request.email,
        password_hash,
    };

    match db.update_user(user.id, update).await? {
        UserUpdateOutcome::Applied => Ok(Json(MessageResponse::new(
            "User profile updated successfully.",
        ))),
        UserUpdateOutcome::EmailTaken => Err(ServerError::EmailTaken),
        UserUpdateOutcome::UserNotFound => Err(ServerError::UserByIdNotFound(user.id)),
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/{user_id}", rejection(ServerError))]
struct UserPath {
    user_id: Id<UserMarker>,
}

async fn get_user(
    UserPath { user_id }: UserPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<User>> {
    let user = db
        .fetch_user(user_id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(user_id))?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/{user_id}/posts", rejection(ServerError))]
struct UserPostsPath {
    user_id: Id<UserMarker>,
}

async fn get_user_posts(
    UserPostsPath { user_id }: UserPostsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<Post>>> {
    db.fetch_user(user_id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(user_id))?;

    let posts = db.fetch_posts_by_author(user_id).await?;
    if posts.is_empty() {
        return Err(ServerError::NoPostsForUser(user_id));
    }

    Ok(Json(posts))
}

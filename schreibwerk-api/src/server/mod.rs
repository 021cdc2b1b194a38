use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use json::Json;
use schreibwerk_common::model::{
    Id,
    auth::{PasswordHashError, TokenError, TokenSigner},
    post::PostMarker,
    user::UserMarker,
};
use schreibwerk_db::client::{DbClient, DbError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod auth;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub token_signer: TokenSigner,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authentication failed: Token not provided or malformed")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("Authentication failed: {0}")]
    InvalidToken(TokenError),
    #[error("Authentication failed: User not found")]
    UnknownTokenUser,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Access denied: Your account is deactivated")]
    Blocked,
    #[error("Access denied: Admin role required")]
    AdminRequired,
    #[error("You are not following this user. Access denied")]
    ProfileAccessDenied,
    #[error("You cannot follow or unfollow yourself")]
    SelfInteraction,
    #[error("You are already following this user")]
    AlreadyFollowing(Id<UserMarker>),
    #[error("You are not following this user")]
    NotFollowed(Id<UserMarker>),
    #[error("You have already rated this post")]
    AlreadyRated(Id<PostMarker>),
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Password could not be processed: {0}")]
    PasswordHash(#[from] PasswordHashError),
    #[error("Token could not be issued: {0}")]
    TokenIssue(TokenError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("User with id {0} was not found")]
    UserByIdNotFound(Id<UserMarker>),
    #[error("No posts found for user with id {0}")]
    NoPostsForUser(Id<UserMarker>),
    #[error("Post with id {0} was not found")]
    PostByIdNotFound(Id<PostMarker>),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::UserByIdNotFound(_)
            | ServerError::NoPostsForUser(_)
            | ServerError::PostByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidToken(_)
            | ServerError::UnknownTokenUser
            | ServerError::InvalidCredentials
            | ServerError::ProfileAccessDenied => StatusCode::UNAUTHORIZED,
            ServerError::Blocked | ServerError::AdminRequired => StatusCode::FORBIDDEN,
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::SelfInteraction
            | ServerError::AlreadyFollowing(_)
            | ServerError::NotFollowed(_)
            | ServerError::AlreadyRated(_)
            | ServerError::EmailTaken => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_)
            | ServerError::PasswordHash(_)
            | ServerError::TokenIssue(_)
            | ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::ServerError;
    use axum::http::StatusCode;
    use schreibwerk_common::model::Id;

    #[test]
    fn error_statuses() {
        assert_eq!(
            ServerError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::UnknownTokenUser.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ServerError::Blocked.status(), StatusCode::FORBIDDEN);
        assert_eq!(ServerError::AdminRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServerError::SelfInteraction.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::AlreadyRated(Id::random()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::EmailTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::PostByIdNotFound(Id::random()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::ProfileAccessDenied.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}

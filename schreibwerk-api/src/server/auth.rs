use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use schreibwerk_common::model::{auth::TokenSigner, user::User};
use schreibwerk_db::client::DbClient;
use std::sync::Arc;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The identity resolved from the bearer token of the current request.
///
/// Extraction fails with 401 when the token is missing, malformed, expired
/// or points at no user, and with 403 when the account is blocked. Handlers
/// receive the identity explicitly; nothing is stashed in request state.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    #[must_use]
    pub fn into_user(self) -> User {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    TokenSigner: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?;

        let claims = TokenSigner::from_ref(state)
            .decode(bearer.token())
            .map_err(ServerError::InvalidToken)?;

        let user = Arc::<DbClient>::from_ref(state)
            .fetch_user(claims.sub)
            .await?
            .ok_or(ServerError::UnknownTokenUser)?;

        if user.blocked {
            return Err(ServerError::Blocked);
        }

        Ok(Self(user))
    }
}

/// An authenticated user that additionally carries the admin role.
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    Arc<DbClient>: FromRef<S>,
    TokenSigner: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(ServerError::AdminRequired);
        }

        Ok(Self(user))
    }
}

use crate::server::ServerRouter;
use axum::Router;
use serde::Serialize;

mod admin;
mod interaction;
mod posts;
mod search;
mod users;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(users::routes())
        .merge(posts::routes())
        .merge(interaction::routes())
        .merge(search::routes())
        .merge(admin::routes())
}

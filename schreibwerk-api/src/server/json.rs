use crate::server::ServerError;
use axum::{
    Json as AxumJson,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;
use serde::Serialize;

/// JSON extractor and response body whose rejections surface as
/// [`ServerError`], so malformed request bodies get the regular
/// `{status, message}` error shape.
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&self.0);
        match body {
            Ok(body) => (TypedHeader(ContentType::json()), body).into_response(),
            Err(err) => ServerError::JsonResponse(err).into_response(),
        }
    }
}

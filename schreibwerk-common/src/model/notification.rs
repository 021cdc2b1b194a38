use crate::model::{Id, user::UserMarker};
use serde::Serialize;
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct NotificationMarker;

/// Append-only inbox entry informing a user about another user's action.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Notification {
    pub id: Id<NotificationMarker>,
    pub text: String,
    pub from: Id<UserMarker>,
    pub read: bool,
    pub created_at: UtcDateTime,
}

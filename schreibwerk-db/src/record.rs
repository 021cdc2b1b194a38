use schreibwerk_common::model::{
    ModelValidationError,
    auth::HashedPassword,
    notification::Notification,
    post::{Comment, Post, PostOverview, PostSummary, Rating, RatingValue},
    user::{Email, Role, User, Username},
};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub blocked: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub struct CredentialRecord {
    #[sqlx(flatten)]
    pub user: UserRecord,
    pub password_hash: String,
}

#[derive(Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub struct PostRecord {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub disabled: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub struct CommentRecord {
    pub comment_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub struct RatingRecord {
    pub author_id: Uuid,
    pub value: i16,
}

#[derive(Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub struct NotificationRecord {
    pub notification_id: Uuid,
    pub text: String,
    pub from_user_id: Uuid,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, PartialEq, Debug, sqlx::FromRow)]
pub struct PostSummaryRecord {
    pub title: String,
    pub content: String,
    pub username: String,
    pub category: String,
    pub created_at: OffsetDateTime,
    pub average_rating: f64,
}

#[derive(Clone, PartialEq, Debug, sqlx::FromRow)]
pub struct PostOverviewRecord {
    pub post_id: Uuid,
    pub title: String,
    pub username: String,
    pub created_at: OffsetDateTime,
    pub comment_count: i64,
    pub average_rating: f64,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let roles = value
            .roles
            .iter()
            .map(|role| role.parse::<Role>())
            .collect::<Result<_, _>>()?;

        Ok(Self {
            id: value.user_id.into(),
            username: Username::new(value.username)?,
            email: Email::new(value.email)?,
            roles,
            blocked: value.blocked,
        })
    }
}

impl TryFrom<CredentialRecord> for (User, HashedPassword) {
    type Error = ModelValidationError;

    fn try_from(value: CredentialRecord) -> Result<Self, Self::Error> {
        let user = User::try_from(value.user)?;
        Ok((user, HashedPassword::from_phc_string(value.password_hash)))
    }
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Self {
            id: value.post_id.into(),
            author: value.author_id.into(),
            title: value.title,
            content: value.content,
            category: value.category,
            disabled: value.disabled,
            created_at: value.created_at.into(),
        }
    }
}

impl From<CommentRecord> for Comment {
    fn from(value: CommentRecord) -> Self {
        Self {
            id: value.comment_id.into(),
            text: value.text,
            author: value.author_id.into(),
            created_at: value.created_at.into(),
        }
    }
}

impl TryFrom<RatingRecord> for Rating {
    type Error = ModelValidationError;

    fn try_from(value: RatingRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            value: RatingValue::try_from(value.value)?,
            author: value.author_id.into(),
        })
    }
}

impl From<NotificationRecord> for Notification {
    fn from(value: NotificationRecord) -> Self {
        Self {
            id: value.notification_id.into(),
            text: value.text,
            from: value.from_user_id.into(),
            read: value.read,
            created_at: value.created_at.into(),
        }
    }
}

impl TryFrom<PostSummaryRecord> for PostSummary {
    type Error = ModelValidationError;

    fn try_from(value: PostSummaryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            content: value.content,
            author: Username::new(value.username)?,
            category: value.category,
            creation_date: value.created_at.into(),
            average_rating: value.average_rating,
        })
    }
}

impl TryFrom<PostOverviewRecord> for PostOverview {
    type Error = ModelValidationError;

    fn try_from(value: PostOverviewRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.into(),
            title: value.title,
            author: Username::new(value.username)?,
            creation_date: value.created_at.into(),
            comment_count: value.comment_count,
            average_rating: value.average_rating,
        })
    }
}

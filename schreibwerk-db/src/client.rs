use crate::record::{
    CommentRecord, CredentialRecord, NotificationRecord, PostOverviewRecord, PostRecord,
    PostSummaryRecord, RatingRecord, UserRecord,
};
use schreibwerk_common::model::{
    Id, ModelValidationError,
    auth::HashedPassword,
    notification::Notification,
    post::{
        Comment, CreatePost, FullPost, Post, PostDetails, PostMarker, PostOverview, PostSortField,
        PostSummary, Rating, RatingValue, SortOrder,
    },
    user::{Email, Profile, Role, User, UserMarker, Username},
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Result of toggling an edge in the follow graph.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum FollowChange {
    Applied,
    AlreadyInEffect,
    TargetNotFound,
}

/// Result of applying a profile update.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum UserUpdateOutcome {
    Applied,
    EmailTaken,
    UserNotFound,
}

/// Fields of a profile update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub password_hash: Option<HashedPassword>,
}

pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "
            SELECT user_id, username, email, roles, blocked
            FROM users
            WHERE user_id = $1
            ",
        )
        .bind(user_id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    /// Login lookup: the user together with the stored password hash.
    pub async fn fetch_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, HashedPassword)>> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "
            SELECT user_id, username, email, roles, blocked, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.get())
        .fetch_optional(&self.pool)
        .await?;

        let credentials = record.map(<(User, HashedPassword)>::try_from).transpose()?;
        Ok(credentials)
    }

    /// Returns `None` when the email is already registered.
    pub async fn create_user(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &HashedPassword,
    ) -> Result<Option<Id<UserMarker>>> {
        let roles: Vec<String> = vec![Role::User.as_str().to_owned()];

        let inserted = sqlx::query_scalar::<_, Uuid>(
            "
            INSERT INTO users (user_id, username, email, password_hash, roles, blocked)
            VALUES ($1, $2, $3, $4, $5, false)
            ON CONFLICT (email) DO NOTHING
            RETURNING user_id
            ",
        )
        .bind(Uuid::new_v4())
        .bind(username.get())
        .bind(email.get())
        .bind(password_hash.as_phc_str())
        .bind(roles)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.map(Id::new))
    }

    /// Applies the provided fields. An email already registered to another
    /// account comes back as [`UserUpdateOutcome::EmailTaken`], even when a
    /// concurrent registration claimed it after the caller's checks.
    pub async fn update_user(
        &self,
        user_id: Id<UserMarker>,
        update: UserUpdate,
    ) -> Result<UserUpdateOutcome> {
        let result = sqlx::query(
            "
            UPDATE users
            SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash)
            WHERE user_id = $1
            ",
        )
        .bind(user_id.uuid())
        .bind(update.username.map(Username::into_inner))
        .bind(update.email.map(Email::into_inner))
        .bind(
            update
                .password_hash
                .map(|hash| hash.as_phc_str().to_owned()),
        )
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(UserUpdateOutcome::Applied),
            Ok(_) => Ok(UserUpdateOutcome::UserNotFound),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Ok(UserUpdateOutcome::EmailTaken)
            }
            Err(error) => Err(error.into()),
        }
    }

    pub async fn fetch_profile(&self, user_id: Id<UserMarker>) -> Result<Option<Profile>> {
        let Some(user) = self.fetch_user(user_id).await? else {
            return Ok(None);
        };

        let following = sqlx::query_scalar::<_, Uuid>(
            "SELECT followee_id FROM follows WHERE follower_id = $1 ORDER BY created_at",
        )
        .bind(user_id.uuid())
        .fetch_all(&self.pool)
        .await?;

        let followers = sqlx::query_scalar::<_, Uuid>(
            "SELECT follower_id FROM follows WHERE followee_id = $1 ORDER BY created_at",
        )
        .bind(user_id.uuid())
        .fetch_all(&self.pool)
        .await?;

        let notifications = sqlx::query_as::<_, NotificationRecord>(
            "
            SELECT notification_id, text, from_user_id, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at
            ",
        )
        .bind(user_id.uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Profile {
            user,
            following: following.into_iter().map(Id::new).collect(),
            followers: followers.into_iter().map(Id::new).collect(),
            notifications: notifications.into_iter().map(Notification::from).collect(),
        }))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username, email, roles, blocked FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        let users = records
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    /// Returns `false` when no such user exists.
    pub async fn set_user_blocked(
        &self,
        user_id: Id<UserMarker>,
        blocked: bool,
    ) -> Result<bool> {
        let affected = sqlx::query("UPDATE users SET blocked = $2 WHERE user_id = $1")
            .bind(user_id.uuid())
            .bind(blocked)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    /// Follow edge plus the notification for the target, one transaction.
    pub async fn create_follow(
        &self,
        follower: Id<UserMarker>,
        followee: Id<UserMarker>,
        notification_text: &str,
    ) -> Result<FollowChange> {
        let mut tx = self.pool.begin().await?;

        if !Self::user_exists(&mut tx, followee).await? {
            return Ok(FollowChange::TargetNotFound);
        }

        let inserted = sqlx::query_scalar::<_, Uuid>(
            "
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING follower_id
            ",
        )
        .bind(follower.uuid())
        .bind(followee.uuid())
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            return Ok(FollowChange::AlreadyInEffect);
        }

        Self::insert_notification(&mut tx, followee, follower, notification_text).await?;

        tx.commit().await?;
        Ok(FollowChange::Applied)
    }

    pub async fn delete_follow(
        &self,
        follower: Id<UserMarker>,
        followee: Id<UserMarker>,
    ) -> Result<FollowChange> {
        let mut tx = self.pool.begin().await?;

        if !Self::user_exists(&mut tx, followee).await? {
            return Ok(FollowChange::TargetNotFound);
        }

        let affected =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower.uuid())
                .bind(followee.uuid())
                .execute(&mut *tx)
                .await?
                .rows_affected();

        tx.commit().await?;

        if affected > 0 {
            Ok(FollowChange::Applied)
        } else {
            Ok(FollowChange::AlreadyInEffect)
        }
    }

    pub async fn is_following(
        &self,
        follower: Id<UserMarker>,
        followee: Id<UserMarker>,
    ) -> Result<bool> {
        let found = sqlx::query_scalar::<_, Uuid>(
            "SELECT follower_id FROM follows WHERE follower_id = $1 AND followee_id = $2",
        )
        .bind(follower.uuid())
        .bind(followee.uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn create_post(
        &self,
        author: Id<UserMarker>,
        post: &CreatePost,
    ) -> Result<Id<PostMarker>> {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            "
            INSERT INTO posts (post_id, author_id, title, content, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING post_id
            ",
        )
        .bind(Uuid::new_v4())
        .bind(author.uuid())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted.into())
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = sqlx::query_as::<_, PostRecord>(
            "
            SELECT post_id, author_id, title, content, category, disabled, created_at
            FROM posts
            WHERE post_id = $1
            ",
        )
        .bind(post_id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Post::from))
    }

    pub async fn fetch_full_post(&self, post_id: Id<PostMarker>) -> Result<Option<FullPost>> {
        let Some(post) = self.fetch_post(post_id).await? else {
            return Ok(None);
        };

        let comments = self.fetch_comments(post_id).await?;
        let ratings = self.fetch_ratings(post_id).await?;

        Ok(Some(FullPost {
            post,
            comments,
            ratings,
        }))
    }

    pub async fn fetch_posts_by_author(&self, author: Id<UserMarker>) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            "
            SELECT post_id, author_id, title, content, category, disabled, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at
            ",
        )
        .bind(author.uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Post::from).collect())
    }

    /// Renames a post; `false` when it is absent or owned by someone else.
    pub async fn update_post_title(
        &self,
        author: Id<UserMarker>,
        post_id: Id<PostMarker>,
        title: &str,
    ) -> Result<bool> {
        let affected =
            sqlx::query("UPDATE posts SET title = $3 WHERE post_id = $1 AND author_id = $2")
                .bind(post_id.uuid())
                .bind(author.uuid())
                .bind(title)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(affected > 0)
    }

    /// Removes the post record; comments and ratings go with it.
    pub async fn delete_post(
        &self,
        author: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM posts WHERE post_id = $1 AND author_id = $2")
            .bind(post_id.uuid())
            .bind(author.uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    /// Comment plus the notification for the post author, one transaction.
    pub async fn add_comment(
        &self,
        post: &Post,
        author: Id<UserMarker>,
        text: &str,
        notification_text: &str,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, CommentRecord>(
            "
            INSERT INTO comments (comment_id, post_id, author_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING comment_id, author_id, text, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(post.id.uuid())
        .bind(author.uuid())
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_notification(&mut tx, post.author, author, notification_text).await?;

        tx.commit().await?;
        Ok(record.into())
    }

    /// Rating plus the notification for the post author, one transaction.
    /// Returns `false` when this author already rated the post.
    pub async fn add_rating(
        &self,
        post: &Post,
        author: Id<UserMarker>,
        value: RatingValue,
        notification_text: &str,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            "
            INSERT INTO ratings (post_id, author_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, author_id) DO NOTHING
            RETURNING post_id
            ",
        )
        .bind(post.id.uuid())
        .bind(author.uuid())
        .bind(i16::from(value.get()))
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            return Ok(false);
        }

        Self::insert_notification(&mut tx, post.author, author, notification_text).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Filter, sort, then paginate, in that order. Disabled posts never
    /// appear in listings.
    pub async fn search_posts(
        &self,
        category: Option<&str>,
        sort_field: PostSortField,
        sort_order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostSummary>> {
        let order_column = match sort_field {
            PostSortField::CreationDate => "posts.created_at",
            PostSortField::Title => "posts.title",
            PostSortField::Category => "posts.category",
        };
        let order_direction = match sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        // Sort columns come from the whitelist above, never from input.
        let query = format!(
            "
            SELECT
                posts.title,
                posts.content,
                users.username,
                posts.category,
                posts.created_at,
                CAST(COALESCE(AVG(ratings.value), 0) AS DOUBLE PRECISION) AS average_rating
            FROM posts
            JOIN users ON users.user_id = posts.author_id
            LEFT JOIN ratings ON ratings.post_id = posts.post_id
            WHERE NOT posts.disabled AND ($1::text IS NULL OR posts.category = $1)
            GROUP BY posts.post_id, users.user_id
            ORDER BY {order_column} {order_direction}
            LIMIT $2 OFFSET $3
            "
        );

        let records = sqlx::query_as::<_, PostSummaryRecord>(&query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let summaries = records
            .into_iter()
            .map(PostSummary::try_from)
            .collect::<Result<_, _>>()?;
        Ok(summaries)
    }

    /// Moderation listing over every post, disabled ones included.
    pub async fn list_all_posts(&self) -> Result<Vec<PostOverview>> {
        let records = sqlx::query_as::<_, PostOverviewRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                users.username,
                posts.created_at,
                (SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.post_id)
                    AS comment_count,
                CAST(COALESCE(AVG(ratings.value), 0) AS DOUBLE PRECISION) AS average_rating
            FROM posts
            JOIN users ON users.user_id = posts.author_id
            LEFT JOIN ratings ON ratings.post_id = posts.post_id
            GROUP BY posts.post_id, users.user_id
            ORDER BY posts.created_at
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let overviews = records
            .into_iter()
            .map(PostOverview::try_from)
            .collect::<Result<_, _>>()?;
        Ok(overviews)
    }

    pub async fn fetch_post_details(
        &self,
        post_id: Id<PostMarker>,
    ) -> Result<Option<PostDetails>> {
        let Some(full_post) = self.fetch_full_post(post_id).await? else {
            return Ok(None);
        };

        let author = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE user_id = $1")
            .bind(full_post.post.author.uuid())
            .fetch_one(&self.pool)
            .await?;

        let average = full_post.average_rating();
        Ok(Some(PostDetails {
            title: full_post.post.title,
            content: full_post.post.content,
            category: full_post.post.category,
            disabled: full_post.post.disabled,
            author: Username::new(author).map_err(ModelValidationError::from)?,
            comments: full_post.comments,
            average_rating: average,
        }))
    }

    /// Returns `false` when no such post exists.
    pub async fn set_post_disabled(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let affected = sqlx::query("UPDATE posts SET disabled = true WHERE post_id = $1")
            .bind(post_id.uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn fetch_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let records = sqlx::query_as::<_, CommentRecord>(
            "
            SELECT comment_id, author_id, text, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at
            ",
        )
        .bind(post_id.uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Comment::from).collect())
    }

    async fn fetch_ratings(&self, post_id: Id<PostMarker>) -> Result<Vec<Rating>> {
        let records = sqlx::query_as::<_, RatingRecord>(
            "SELECT author_id, value FROM ratings WHERE post_id = $1",
        )
        .bind(post_id.uuid())
        .fetch_all(&self.pool)
        .await?;

        let ratings = records
            .into_iter()
            .map(Rating::try_from)
            .collect::<Result<_, _>>()?;
        Ok(ratings)
    }

    async fn user_exists(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Id<UserMarker>,
    ) -> Result<bool> {
        let found = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM users WHERE user_id = $1")
            .bind(user_id.uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(found.is_some())
    }

    async fn insert_notification(
        tx: &mut Transaction<'_, Postgres>,
        recipient: Id<UserMarker>,
        from: Id<UserMarker>,
        text: &str,
    ) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO notifications (notification_id, user_id, text, from_user_id, read)
            VALUES ($1, $2, $3, $4, false)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(recipient.uuid())
        .bind(text)
        .bind(from.uuid())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{DbClient, FollowChange, UserUpdate, UserUpdateOutcome};
    use schreibwerk_common::model::{
        Id,
        auth::HashedPassword,
        post::{CreatePost, RatingValue},
        user::{Email, UserMarker, Username},
    };
    use sqlx::PgPool;

    async fn seed_user(db: &DbClient, username: &str, email: &str) -> Id<UserMarker> {
        let username = Username::new(username.to_owned()).unwrap();
        let email = Email::new(email.to_owned()).unwrap();
        let password_hash = HashedPassword::hash("hunter2").unwrap();

        db.create_user(&username, &email, &password_hash)
            .await
            .unwrap()
            .unwrap()
    }

    fn sample_post() -> CreatePost {
        CreatePost {
            title: "Soldering basics".to_owned(),
            content: "Flux first, always.".to_owned(),
            category: "electronics".to_owned(),
        }
    }

    #[sqlx::test]
    async fn duplicate_email_registration_rejected(pool: PgPool) {
        let db = DbClient::new(pool);
        let anna = seed_user(&db, "anna", "anna@example.com").await;

        let username = Username::new("impostor".to_owned()).unwrap();
        let email = Email::new("anna@example.com".to_owned()).unwrap();
        let password_hash = HashedPassword::hash("different").unwrap();

        let second = db
            .create_user(&username, &email, &password_hash)
            .await
            .unwrap();
        assert_eq!(second, None);

        let original = db.fetch_user(anna).await.unwrap().unwrap();
        assert_eq!(original.username.get(), "anna");
    }

    #[sqlx::test]
    async fn follow_round_trip_updates_both_profiles(pool: PgPool) {
        let db = DbClient::new(pool);
        let anna = seed_user(&db, "anna", "anna@example.com").await;
        let ben = seed_user(&db, "ben", "ben@example.com").await;

        let change = db
            .create_follow(anna, ben, "anna started following you.")
            .await
            .unwrap();
        assert_eq!(change, FollowChange::Applied);
        assert!(db.is_following(anna, ben).await.unwrap());

        let anna_profile = db.fetch_profile(anna).await.unwrap().unwrap();
        assert_eq!(anna_profile.following, vec![ben]);
        assert!(anna_profile.followers.is_empty());

        let ben_profile = db.fetch_profile(ben).await.unwrap().unwrap();
        assert_eq!(ben_profile.followers, vec![anna]);

        let repeat = db
            .create_follow(anna, ben, "anna started following you.")
            .await
            .unwrap();
        assert_eq!(repeat, FollowChange::AlreadyInEffect);

        let unfollow = db.delete_follow(anna, ben).await.unwrap();
        assert_eq!(unfollow, FollowChange::Applied);
        assert!(!db.is_following(anna, ben).await.unwrap());

        let repeat_unfollow = db.delete_follow(anna, ben).await.unwrap();
        assert_eq!(repeat_unfollow, FollowChange::AlreadyInEffect);

        let anna_profile = db.fetch_profile(anna).await.unwrap().unwrap();
        assert!(anna_profile.following.is_empty());
    }

    #[sqlx::test]
    async fn follow_of_unknown_user_reports_missing_target(pool: PgPool) {
        let db = DbClient::new(pool);
        let anna = seed_user(&db, "anna", "anna@example.com").await;

        let change = db
            .create_follow(anna, Id::random(), "anna started following you.")
            .await
            .unwrap();
        assert_eq!(change, FollowChange::TargetNotFound);
    }

    #[sqlx::test]
    async fn second_rating_by_same_author_rejected(pool: PgPool) {
        let db = DbClient::new(pool);
        let anna = seed_user(&db, "anna", "anna@example.com").await;
        let ben = seed_user(&db, "ben", "ben@example.com").await;

        let post_id = db.create_post(anna, &sample_post()).await.unwrap();
        let post = db.fetch_post(post_id).await.unwrap().unwrap();

        let first = RatingValue::new(4).unwrap();
        let applied = db
            .add_rating(&post, ben, first, "ben rated your post")
            .await
            .unwrap();
        assert!(applied);

        let second = RatingValue::new(1).unwrap();
        let applied = db
            .add_rating(&post, ben, second, "ben rated your post")
            .await
            .unwrap();
        assert!(!applied);

        // The stored rating keeps its first value.
        let full = db.fetch_full_post(post_id).await.unwrap().unwrap();
        assert_eq!(full.ratings.len(), 1);
        assert_eq!(full.ratings[0].value.get(), 4);
        assert!((full.average_rating() - 4.0).abs() < f64::EPSILON);
    }

    #[sqlx::test]
    async fn interactions_notify_the_targeted_user(pool: PgPool) {
        let db = DbClient::new(pool);
        let anna = seed_user(&db, "anna", "anna@example.com").await;
        let ben = seed_user(&db, "ben", "ben@example.com").await;

        db.create_follow(ben, anna, "ben started following you.")
            .await
            .unwrap();

        let post_id = db.create_post(anna, &sample_post()).await.unwrap();
        let post = db.fetch_post(post_id).await.unwrap().unwrap();
        db.add_comment(
            &post,
            ben,
            "Great writeup.",
            "ben commented on your post: \"Soldering basics\".",
        )
        .await
        .unwrap();

        let profile = db.fetch_profile(anna).await.unwrap().unwrap();
        assert_eq!(profile.notifications.len(), 2);
        assert!(
            profile
                .notifications
                .iter()
                .any(|notification| notification.text == "ben started following you.")
        );
        assert!(profile.notifications.iter().any(|notification| {
            notification.text == "ben commented on your post: \"Soldering basics\"."
        }));
        assert!(
            profile
                .notifications
                .iter()
                .all(|notification| notification.from == ben && !notification.read)
        );

        let ben_profile = db.fetch_profile(ben).await.unwrap().unwrap();
        assert!(ben_profile.notifications.is_empty());
    }

    #[sqlx::test]
    async fn profile_update_to_taken_email_rejected(pool: PgPool) {
        let db = DbClient::new(pool);
        seed_user(&db, "anna", "anna@example.com").await;
        let ben = seed_user(&db, "ben", "ben@example.com").await;

        let update = UserUpdate {
            email: Some(Email::new("anna@example.com".to_owned()).unwrap()),
            ..UserUpdate::default()
        };
        let outcome = db.update_user(ben, update).await.unwrap();
        assert_eq!(outcome, UserUpdateOutcome::EmailTaken);

        let update = UserUpdate {
            username: Some(Username::new("benji".to_owned()).unwrap()),
            ..UserUpdate::default()
        };
        let outcome = db.update_user(ben, update).await.unwrap();
        assert_eq!(outcome, UserUpdateOutcome::Applied);

        let outcome = db
            .update_user(Id::random(), UserUpdate::default())
            .await
            .unwrap();
        assert_eq!(outcome, UserUpdateOutcome::UserNotFound);

        let ben_user = db.fetch_user(ben).await.unwrap().unwrap();
        assert_eq!(ben_user.username.get(), "benji");
        assert_eq!(ben_user.email.get(), "ben@example.com");
    }
}

use crate::model::{
    Id,
    user::{UserMarker, Username},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::UtcDateTime;

pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: Id<UserMarker>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub disabled: bool,
    pub created_at: UtcDateTime,
}

/// A post together with its append-only comment and rating sequences.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FullPost {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
    pub ratings: Vec<Rating>,
}

impl FullPost {
    #[must_use]
    pub fn average_rating(&self) -> f64 {
        average_rating(&self.ratings)
    }
}

/// Mean rating value, defined as `0.0` for an unrated post.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let sum: u32 = ratings.iter().map(|rating| u32::from(rating.value.get())).sum();
    f64::from(sum) / ratings.len() as f64
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub text: String,
    pub author: Id<UserMarker>,
    pub created_at: UtcDateTime,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Rating {
    pub value: RatingValue,
    pub author: Id<UserMarker>,
}

/// Listing entry with the rating average precomputed.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub content: String,
    pub author: Username,
    pub category: String,
    pub creation_date: UtcDateTime,
    pub average_rating: f64,
}

/// Moderation listing row: one line per post across all authors.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PostOverview {
    pub id: Id<PostMarker>,
    pub title: String,
    pub author: Username,
    pub creation_date: UtcDateTime,
    pub comment_count: i64,
    pub average_rating: f64,
}

/// Moderation detail view of a single post.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PostDetails {
    pub title: String,
    pub content: String,
    pub category: String,
    pub disabled: bool,
    pub author: Username,
    pub comments: Vec<Comment>,
    pub average_rating: f64,
}

/// Columns a post listing may be ordered by.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSortField {
    #[default]
    CreationDate,
    Title,
    Category,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Rating value out of range: {0}")]
pub struct InvalidRatingValueError(i64);

impl RatingValue {
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (RATING_MIN..=RATING_MAX).contains(&value).then_some(Self(value))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for RatingValue {
    /// A rating submitted without a value counts as one star.
    fn default() -> Self {
        Self(RATING_MIN)
    }
}

impl TryFrom<u8> for RatingValue {
    type Error = InvalidRatingValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidRatingValueError(i64::from(value)))
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = InvalidRatingValueError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(InvalidRatingValueError(i64::from(value)))
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = u8::deserialize(deserializer)?;
        RatingValue::new(inner).ok_or_else(|| {
            Error::invalid_value(Unexpected::Unsigned(inner.into()), &"RatingValue")
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        post::{Rating, RatingValue, average_rating},
    };

    #[test]
    fn rating_value_bounds() {
        let legal = [1, 3, 5];
        let illegal = [0, 6, u8::MAX];

        for value in legal {
            assert!(RatingValue::new(value).is_some());
        }
        for value in illegal {
            assert!(RatingValue::new(value).is_none());
        }

        assert_eq!(RatingValue::default().get(), 1);
    }

    #[test]
    fn average_of_ratings() {
        let rating = |value| Rating {
            value: RatingValue::new(value).unwrap(),
            author: Id::random(),
        };

        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[rating(5), rating(3)]), 4.0);
        assert_eq!(average_rating(&[rating(1), rating(2), rating(3)]), 2.0);
    }
}

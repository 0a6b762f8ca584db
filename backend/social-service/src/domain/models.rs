use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Profile entity - id is shared with the auth identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Post entity - a user-authored content item with optional media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub media_urls: Vec<String>,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Row inserted by the composer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub user_id: Uuid,
    pub content: String,
    pub media_urls: Vec<String>,
}

/// Author fields joined onto a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    /// Display name; profiles carry no separate name so this mirrors username
    pub name: String,
}

impl Author {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            avatar_url: profile.avatar_url.clone(),
            name: profile.username.clone(),
        }
    }
}

/// Flat row returned by the feed query (post joined with author and counts)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FeedRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub media_urls: Vec<String>,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub avatar_url: Option<String>,
    pub comment_count: i64,
    pub bookmark_count: i64,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

/// Post as rendered in a feed, enriched for the current viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author: Author,
    pub content: String,
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub comment_count: i64,
    pub bookmark_count: i64,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

impl From<FeedRow> for FeedPost {
    fn from(row: FeedRow) -> Self {
        Self {
            id: row.id,
            author: Author {
                id: row.user_id,
                name: row.username.clone(),
                username: row.username,
                avatar_url: row.avatar_url,
            },
            content: row.content,
            media_urls: row.media_urls,
            created_at: row.created_at,
            likes_count: row.likes_count,
            reposts_count: row.reposts_count,
            comment_count: row.comment_count,
            bookmark_count: row.bookmark_count,
            is_liked: row.is_liked,
            is_bookmarked: row.is_bookmarked,
        }
    }
}

impl FeedPost {
    /// Freshly created post, before anyone interacted with it
    pub fn new_for_author(post: Post, author: &Profile) -> Self {
        Self {
            id: post.id,
            author: Author::from_profile(author),
            content: post.content,
            media_urls: post.media_urls,
            created_at: post.created_at,
            likes_count: post.likes_count,
            reposts_count: post.reposts_count,
            comment_count: 0,
            bookmark_count: 0,
            is_liked: false,
            is_bookmarked: false,
        }
    }
}

/// Feed read parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedQuery {
    /// User whose likes/bookmarks drive the flags; None for anonymous reads
    pub viewer: Option<Uuid>,
    /// Restrict to one author (profile view)
    pub author: Option<Uuid>,
    /// Row cap; None reads every post
    pub limit: Option<i64>,
}

/// Follow relation - directed subscription of one user to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowRelation {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Result of a follow attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
}

/// Per-user per-day analytics aggregate; columns may be NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalyticsRecord {
    pub date: NaiveDate,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub watch_time_seconds: Option<i64>,
}

/// User interaction with a post, dispatched by tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementAction {
    Like,
    Bookmark,
    Delete,
    Repost,
}

impl EngagementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementAction::Like => "like",
            EngagementAction::Bookmark => "bookmark",
            EngagementAction::Delete => "delete",
            EngagementAction::Repost => "repost",
        }
    }
}

impl fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngagementAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(EngagementAction::Like),
            "bookmark" => Ok(EngagementAction::Bookmark),
            "delete" => Ok(EngagementAction::Delete),
            "repost" => Ok(EngagementAction::Repost),
            other => Err(format!("unknown engagement action: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_row_maps_author_fields() {
        let author_id = Uuid::new_v4();
        let row = FeedRow {
            id: Uuid::new_v4(),
            user_id: author_id,
            content: "hello".into(),
            media_urls: vec!["https://cdn/x.png".into()],
            likes_count: 3,
            reposts_count: 0,
            created_at: Utc::now(),
            username: "ada".into(),
            avatar_url: None,
            comment_count: 2,
            bookmark_count: 1,
            is_liked: true,
            is_bookmarked: false,
        };

        let post = FeedPost::from(row);
        assert_eq!(post.author.id, author_id);
        assert_eq!(post.author.name, "ada");
        assert_eq!(post.comment_count, 2);
        assert!(post.is_liked);
    }

    #[test]
    fn test_engagement_action_parsing() {
        assert_eq!("Like".parse::<EngagementAction>(), Ok(EngagementAction::Like));
        assert_eq!("repost".parse::<EngagementAction>(), Ok(EngagementAction::Repost));
        assert!("share".parse::<EngagementAction>().is_err());
        assert_eq!(EngagementAction::Bookmark.to_string(), "bookmark");
    }
}

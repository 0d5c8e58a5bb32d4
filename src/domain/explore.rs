//! Explore feed domain types: user-generated posts, likes and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "post_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    Photo,
    Video,
    Blog,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExplorePost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_type: PostType,
    pub title: String,
    pub caption: String,
    pub image_path: Option<String>,
    pub video_path: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_path: Option<String>,
    pub content: String,
    pub destination_id: Option<Uuid>,
    pub view_count: i64,
    pub like_count: i64,
    pub is_approved: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Feed row: post columns plus the author's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FeedRow {
    pub id: Uuid,
    pub post_type: PostType,
    pub title: String,
    pub caption: String,
    pub image_path: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_path: Option<String>,
    pub destination_id: Option<Uuid>,
    pub view_count: i64,
    pub like_count: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub author_email: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for the feed
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeedQuery {
    #[serde(default)]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub destination: Option<Uuid>,
}

/// Request DTO for post creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub post_type: PostType,
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub destination_id: Option<Uuid>,
}

impl CreatePostRequest {
    /// Each post type requires its own media field.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        match self.post_type {
            PostType::Photo if self.image_path.is_none() => {
                Err("photo posts require image_path".to_string())
            }
            PostType::Video if self.video_path.is_none() && self.video_url.is_none() => {
                Err("video posts require video_path or video_url".to_string())
            }
            PostType::Blog if self.content.trim().is_empty() => {
                Err("blog posts require content".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Request DTO for comment creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Response after toggling a like
#[derive(Debug, Clone, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Post detail with comments
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: ExplorePost,
    pub comments: Vec<PostComment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(post_type: PostType) -> CreatePostRequest {
        CreatePostRequest {
            post_type,
            title: "Sunrise at Poon Hill".to_string(),
            caption: String::new(),
            image_path: None,
            video_path: None,
            video_url: None,
            thumbnail_path: None,
            content: String::new(),
            destination_id: None,
        }
    }

    #[test]
    fn photo_posts_require_an_image() {
        let mut req = request(PostType::Photo);
        assert!(req.validate().is_err());
        req.image_path = Some("explore/photos/sunrise.jpg".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn video_posts_accept_either_upload_or_link() {
        let mut req = request(PostType::Video);
        assert!(req.validate().is_err());
        req.video_url = Some("https://youtu.be/abc".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blog_posts_require_content() {
        let mut req = request(PostType::Blog);
        assert!(req.validate().is_err());
        req.content = "Long form trip report".to_string();
        assert!(req.validate().is_ok());
    }
}

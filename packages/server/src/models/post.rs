use chrono::{DateTime, Utc};
use common::PostStatus;
use serde::{Deserialize, Serialize};

use super::comment::CommentThreadResponse;
use super::shared::{Pagination, validate_length};
use super::tag::TagSummary;
use super::user::AuthorSummary;
use crate::error::AppError;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 50;
pub const EXCERPT_MAX: usize = 500;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePostRequest {
    /// Post title (5-200 characters). The slug is derived from it.
    #[schema(example = "Hello World")]
    pub title: String,
    /// Markdown body (at least 50 characters).
    pub content: String,
    /// Optional summary (max 500 characters). Derived from the content when
    /// a post is published without one.
    pub excerpt: Option<String>,
    /// IDs of existing tags.
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    /// Initial status. Defaults to `DRAFT`.
    pub status: Option<PostStatus>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    /// Replaces the full tag set when present.
    pub tag_ids: Option<Vec<i32>>,
    pub status: Option<PostStatus>,
}

fn validate_title(title: &str) -> Result<(), AppError> {
    validate_length(title.trim(), "Title", TITLE_MIN, Some(TITLE_MAX))
}

fn validate_content(content: &str) -> Result<(), AppError> {
    validate_length(content, "Content", CONTENT_MIN, None)
}

fn validate_excerpt(excerpt: &str) -> Result<(), AppError> {
    validate_length(excerpt, "Excerpt", 0, Some(EXCERPT_MAX))
}

pub fn validate_create_post(payload: &CreatePostRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    validate_content(&payload.content)?;
    if let Some(ref excerpt) = payload.excerpt {
        validate_excerpt(excerpt)?;
    }
    Ok(())
}

pub fn validate_update_post(payload: &UpdatePostRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(ref content) = payload.content {
        validate_content(content)?;
    }
    if let Some(ref excerpt) = payload.excerpt {
        validate_excerpt(excerpt)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on title, content or a tag name.
    pub search: Option<String>,
    pub status: Option<PostStatus>,
    /// Author user ID.
    pub author: Option<i32>,
    /// Tag ID.
    pub tag: Option<i32>,
    /// One of `created_at` (default), `published_at`, `view_count`, `like_count`, `title`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// Post summary used in list responses. Content is omitted.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PostListItem {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: AuthorSummary,
    pub tags: Vec<TagSummary>,
    pub status: PostStatus,
    pub view_count: i64,
    pub like_count: u64,
    /// Approved comments only.
    pub comment_count: u64,
    pub share_count: i64,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostListResponse {
    pub data: Vec<PostListItem>,
    pub pagination: Pagination,
}

/// Full post, including its approved comment threads.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PostDetailResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: AuthorSummary,
    pub tags: Vec<TagSummary>,
    pub status: PostStatus,
    pub view_count: i64,
    pub like_count: u64,
    pub comment_count: u64,
    pub share_count: i64,
    pub comments: Vec<CommentThreadResponse>,
    /// Whether the caller has liked this post. Always false for anonymous callers.
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

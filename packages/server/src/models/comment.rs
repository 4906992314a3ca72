use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_length};
use super::user::AuthorSummary;
use crate::error::AppError;

pub const COMMENT_MIN: usize = 2;
pub const COMMENT_MAX: usize = 1000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    #[schema(example = 1)]
    pub post_id: i32,
    /// Comment body (2-1000 characters).
    #[schema(example = "Great post!")]
    pub content: String,
    /// Comment being replied to. Must belong to the same post.
    pub parent_id: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    pub content: String,
}

pub fn validate_comment_content(content: &str) -> Result<(), AppError> {
    validate_length(content.trim(), "Comment", COMMENT_MIN, Some(COMMENT_MAX))
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub post_id: i32,
    pub author: AuthorSummary,
    pub content: String,
    pub parent_id: Option<i32>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An approved comment with its approved replies.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentThreadResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    #[schema(no_recursion)]
    pub replies: Vec<CommentThreadResponse>,
}

impl From<common::comment_tree::Thread<CommentResponse>> for CommentThreadResponse {
    fn from(thread: common::comment_tree::Thread<CommentResponse>) -> Self {
        Self {
            comment: thread.comment,
            replies: thread.replies.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Restrict to comments on this post.
    pub post: Option<i32>,
    /// Filter on approval state. Unapproved comments are only returned to
    /// their author, the post's author, or an admin.
    pub is_approved: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentListResponse {
    pub data: Vec<CommentResponse>,
    pub pagination: Pagination,
}

/// Plain acknowledgement.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Comment approved")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

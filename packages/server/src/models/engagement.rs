use common::{LikeOutcome, UnlikeOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub outcome: LikeOutcome,
    #[schema(example = "Post liked successfully")]
    pub message: String,
    #[schema(example = 1)]
    pub like_count: u64,
}

impl LikeResponse {
    pub fn new(outcome: LikeOutcome, like_count: u64) -> Self {
        Self {
            outcome,
            message: outcome.message().into(),
            like_count,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UnlikeResponse {
    pub outcome: UnlikeOutcome,
    #[schema(example = "Post unliked successfully")]
    pub message: String,
    #[schema(example = 0)]
    pub like_count: u64,
}

impl UnlikeResponse {
    pub fn new(outcome: UnlikeOutcome, like_count: u64) -> Self {
        Self {
            outcome,
            message: outcome.message().into(),
            like_count,
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct ShareRequest {
    /// Where the post was shared (max 50 characters).
    #[schema(example = "twitter")]
    pub platform: Option<String>,
}

pub fn validate_share_request(payload: &ShareRequest) -> Result<(), AppError> {
    if let Some(ref platform) = payload.platform
        && platform.chars().count() > 50
    {
        return Err(AppError::Validation(
            "Platform must be at most 50 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ShareResponse {
    #[schema(example = "Post shared successfully")]
    pub message: String,
    #[schema(example = 4)]
    pub share_count: i64,
}

/// Engagement figures for one post.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AnalyticsResponse {
    pub post_id: i32,
    pub view_count: i64,
    pub like_count: u64,
    /// Approved comments only.
    pub comment_count: u64,
    pub share_count: i64,
    /// `(likes + comments + shares) / views * 100`, two decimals.
    #[schema(example = 66.67)]
    pub engagement_rate: f64,
}

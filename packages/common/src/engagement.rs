use serde::{Deserialize, Serialize};

/// Raw engagement counters for a single post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementCounts {
    pub views: u64,
    pub likes: u64,
    pub approved_comments: u64,
    pub shares: u64,
}

impl EngagementCounts {
    /// `(likes + approved comments + shares) / views * 100`, rounded to two
    /// decimals. Zero for a post nobody has viewed.
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        let interactions = self.likes + self.approved_comments + self.shares;
        let rate = interactions as f64 / self.views as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

/// Result of liking a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LikeOutcome {
    Created,
    AlreadyLiked,
}

/// Result of removing a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnlikeOutcome {
    Removed,
    NotLiked,
}

impl LikeOutcome {
    pub fn from_inserted(inserted: bool) -> Self {
        if inserted {
            Self::Created
        } else {
            Self::AlreadyLiked
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Created => "Post liked successfully",
            Self::AlreadyLiked => "You have already liked this post",
        }
    }
}

impl UnlikeOutcome {
    pub fn from_removed(rows: u64) -> Self {
        if rows > 0 {
            Self::Removed
        } else {
            Self::NotLiked
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Removed => "Post unliked successfully",
            Self::NotLiked => "You have not liked this post",
        }
    }
}

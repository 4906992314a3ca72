//! Which posts and comments an actor is allowed to see.

use crate::policy::Actor;
use crate::post_status::PostStatus;
use crate::role::Role;

/// The set of posts visible to a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    PublishedOnly,
    /// Published posts plus every post by this author.
    PublishedOrAuthoredBy(i32),
    All,
}

impl PostScope {
    pub fn for_viewer(viewer: Option<&Actor>) -> Self {
        match viewer {
            None => Self::PublishedOnly,
            Some(actor) => match actor.role {
                Role::Admin => Self::All,
                Role::Author => Self::PublishedOrAuthoredBy(actor.user_id),
                Role::Reader => Self::PublishedOnly,
            },
        }
    }

    pub fn admits(&self, status: PostStatus, author_id: i32) -> bool {
        match self {
            Self::All => true,
            Self::PublishedOnly => status == PostStatus::Published,
            Self::PublishedOrAuthoredBy(user_id) => {
                status == PostStatus::Published || author_id == *user_id
            }
        }
    }
}

/// The set of comments visible to a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentScope {
    ApprovedOnly,
    /// Approved comments, the viewer's own, and any on posts they wrote.
    ApprovedOrInvolving(i32),
    All,
}

impl CommentScope {
    pub fn for_viewer(viewer: Option<&Actor>) -> Self {
        match viewer {
            None => Self::ApprovedOnly,
            Some(actor) => match actor.role {
                Role::Admin => Self::All,
                Role::Author | Role::Reader => Self::ApprovedOrInvolving(actor.user_id),
            },
        }
    }

    pub fn admits(&self, is_approved: bool, author_id: i32, post_author_id: i32) -> bool {
        match self {
            Self::All => true,
            Self::ApprovedOnly => is_approved,
            Self::ApprovedOrInvolving(user_id) => {
                is_approved || author_id == *user_id || post_author_id == *user_id
            }
        }
    }
}

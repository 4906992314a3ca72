//! Role-based authorization decisions.
//!
//! Every check is a pure function of the acting user and the action; callers
//! fetch whatever ownership data the action needs before asking.

use crate::post_status::PostStatus;
use crate::role::Role;

/// The authenticated user performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Owners and admins may write to an owned resource.
    pub fn owns_or_admin(&self, owner_id: i32) -> bool {
        self.user_id == owner_id || self.role.is_admin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Insufficient permissions")]
    Forbidden,
}

/// Everything an actor can attempt. Resources carry the ownership facts the
/// decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadPost,
    ReadComment,
    ReadTag,
    CreatePost,
    EditPost { author_id: i32 },
    DeletePost { author_id: i32 },
    ChangePostStatus { author_id: i32, to: PostStatus },
    ViewAnalytics { author_id: i32 },
    Engage,
    CreateComment,
    EditComment { author_id: i32 },
    DeleteComment { author_id: i32 },
    ModerateComment { post_author_id: i32 },
    ManageTag,
    EditUser { user_id: i32 },
    DeleteUser { user_id: i32 },
    ChangeUserRole,
    ReadUsers,
}

/// Decide whether `actor` may perform `action`.
pub fn authorize(actor: Option<&Actor>, action: Action) -> Result<(), PolicyError> {
    // Reads are open to everyone; what they return is scoped elsewhere.
    if matches!(
        action,
        Action::ReadPost | Action::ReadComment | Action::ReadTag
    ) {
        return Ok(());
    }

    let actor = actor.ok_or(PolicyError::Unauthenticated)?;

    let allowed = match action {
        Action::ReadPost | Action::ReadComment | Action::ReadTag => true,
        Action::ReadUsers | Action::Engage | Action::CreateComment => true,
        Action::CreatePost | Action::ManageTag => actor.role.can_author(),
        Action::EditPost { author_id }
        | Action::DeletePost { author_id }
        | Action::ViewAnalytics { author_id }
        | Action::EditComment { author_id }
        | Action::DeleteComment { author_id } => actor.owns_or_admin(author_id),
        Action::ChangePostStatus { author_id, to } => {
            actor.owns_or_admin(author_id)
                && match to {
                    PostStatus::Archived => actor.role.can_author(),
                    PostStatus::Draft | PostStatus::Published => true,
                }
        }
        Action::ModerateComment { post_author_id } => actor.owns_or_admin(post_author_id),
        Action::EditUser { user_id } | Action::DeleteUser { user_id } => {
            actor.owns_or_admin(user_id)
        }
        Action::ChangeUserRole => actor.role.is_admin(),
    };

    if allowed {
        Ok(())
    } else {
        Err(PolicyError::Forbidden)
    }
}

//! Post status transitions and the fields derived from them.

use chrono::{DateTime, Utc};

use crate::post_status::PostStatus;

/// Number of content characters used when an excerpt is derived.
pub const EXCERPT_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Cannot change status of an archived post")]
    Archived,
    #[error("Cannot move a post from {from} back to {to}")]
    Backwards { from: PostStatus, to: PostStatus },
}

/// Lifecycle fields of a post before or after a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    /// A freshly created post.
    pub fn new() -> Self {
        Self {
            status: PostStatus::Draft,
            published_at: None,
        }
    }

    /// Apply a status change.
    ///
    /// `published_at` is stamped with `now` the first time the post enters
    /// `Published` and is never touched again.
    pub fn transition(
        &self,
        next: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<Lifecycle, TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(if self.status.is_terminal() {
                TransitionError::Archived
            } else {
                TransitionError::Backwards {
                    from: self.status,
                    to: next,
                }
            });
        }

        let published_at = match (next, self.published_at) {
            (PostStatus::Published, None) => Some(now),
            (_, existing) => existing,
        };

        Ok(Lifecycle {
            status: next,
            published_at,
        })
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the excerpt to store for a post.
///
/// A published post without an excerpt gets the first
/// [`EXCERPT_LENGTH`] characters of its content.
pub fn resolve_excerpt(status: PostStatus, excerpt: &str, content: &str) -> String {
    if status == PostStatus::Published && excerpt.trim().is_empty() {
        content.chars().take(EXCERPT_LENGTH).collect()
    } else {
        excerpt.to_string()
    }
}

pub mod comment_tree;
pub mod engagement;
pub mod lifecycle;
pub mod policy;
pub mod post_status;
pub mod role;
pub mod slug;
pub mod visibility;

pub use engagement::{EngagementCounts, LikeOutcome, UnlikeOutcome};
pub use lifecycle::{Lifecycle, TransitionError};
pub use policy::{Action, Actor, PolicyError, authorize};
pub use post_status::PostStatus;
pub use role::Role;
pub use visibility::{CommentScope, PostScope};

use common::{CommentScope, PostScope, PostStatus};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{ColumnTrait, Condition};

use crate::entity::{comment, post};

/// Rows of `post` the scope lets a viewer see.
pub fn post_condition(scope: PostScope) -> Condition {
    match scope {
        PostScope::All => Condition::all(),
        PostScope::PublishedOnly => {
            Condition::all().add(post::Column::Status.eq(PostStatus::Published))
        }
        PostScope::PublishedOrAuthoredBy(user_id) => Condition::any()
            .add(post::Column::Status.eq(PostStatus::Published))
            .add(post::Column::AuthorId.eq(user_id)),
    }
}

/// Rows of `comment` the scope lets a viewer see. Pending comments stay
/// visible to their author and to the author of the post they are on.
pub fn comment_condition(scope: CommentScope) -> Condition {
    match scope {
        CommentScope::All => Condition::all(),
        CommentScope::ApprovedOnly => Condition::all().add(comment::Column::IsApproved.eq(true)),
        CommentScope::ApprovedOrInvolving(user_id) => Condition::any()
            .add(comment::Column::IsApproved.eq(true))
            .add(comment::Column::AuthorId.eq(user_id))
            .add(
                comment::Column::PostId.in_subquery(
                    SeaQuery::select()
                        .column(post::Column::Id)
                        .from(post::Entity)
                        .and_where(post::Column::AuthorId.eq(user_id))
                        .to_owned(),
                ),
            ),
    }
}

use std::collections::HashMap;

use common::comment_tree::{CommentArena, CommentNode};
use sea_orm::sea_query::LockType;
use sea_orm::*;

use super::post::authors_by_id;
use crate::entity::{comment, post};
use crate::error::AppError;
use crate::models::comment::{CommentResponse, CommentThreadResponse};
use crate::models::user::AuthorSummary;

/// Look up a comment by ID, returning 404 if not found.
pub async fn find_comment<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}

fn to_response(
    model: comment::Model,
    authors: &HashMap<i32, AuthorSummary>,
) -> Result<CommentResponse, AppError> {
    let author = authors
        .get(&model.author_id)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("Author of comment {} missing", model.id)))?;
    Ok(CommentResponse {
        id: model.id,
        post_id: model.post_id,
        author,
        content: model.content,
        parent_id: model.parent_id,
        is_approved: model.is_approved,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// Attach authors to a batch of comments, keeping the input order.
pub async fn build_responses<C: ConnectionTrait>(
    db: &C,
    comments: Vec<comment::Model>,
) -> Result<Vec<CommentResponse>, AppError> {
    let authors = authors_by_id(db, comments.iter().map(|c| c.author_id)).await?;
    comments
        .into_iter()
        .map(|c| to_response(c, &authors))
        .collect()
}

pub async fn build_response<C: ConnectionTrait>(
    db: &C,
    comment: comment::Model,
) -> Result<CommentResponse, AppError> {
    let mut responses = build_responses(db, vec![comment]).await?;
    responses
        .pop()
        .ok_or_else(|| AppError::Internal("Comment response missing".into()))
}

/// Approved threads of a post, oldest first at every level.
pub async fn approved_feed<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
) -> Result<Vec<CommentThreadResponse>, AppError> {
    let comments = comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(db)
        .await?;

    let responses = build_responses(db, comments).await?;
    let arena = CommentArena::new(responses.into_iter().map(|r| CommentNode {
        id: r.id,
        parent_id: r.parent_id,
        is_approved: r.is_approved,
        data: r,
    }));

    Ok(arena
        .into_approved_feed()
        .into_iter()
        .map(CommentThreadResponse::from)
        .collect())
}

/// Delete a comment and every reply below it.
///
/// Call inside a transaction: the post row is locked first, which waits out
/// any reply being inserted under the subtree and holds off new ones until
/// commit.
pub async fn delete_comment_subtree<C: ConnectionTrait>(
    db: &C,
    target: &comment::Model,
) -> Result<u64, DbErr> {
    post::Entity::find_by_id(target.post_id)
        .lock(LockType::Update)
        .one(db)
        .await?;

    let siblings: Vec<(i32, Option<i32>, bool)> = comment::Entity::find()
        .filter(comment::Column::PostId.eq(target.post_id))
        .select_only()
        .column(comment::Column::Id)
        .column(comment::Column::ParentId)
        .column(comment::Column::IsApproved)
        .into_tuple()
        .all(db)
        .await?;

    let arena = CommentArena::new(siblings.into_iter().map(|(id, parent_id, is_approved)| {
        CommentNode {
            id,
            parent_id,
            is_approved,
            data: (),
        }
    }));
    let doomed = arena.subtree_ids(&[target.id]);

    let res = comment::Entity::delete_many()
        .filter(comment::Column::Id.is_in(doomed))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Action, Actor, CommentScope};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{comment, post};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, actor_of};
use crate::extractors::json::AppJson;
use crate::models::comment::*;
use crate::models::shared::{Pagination, page_offset, page_window};
use crate::state::AppState;
use crate::utils::comment::{build_response, build_responses, delete_comment_subtree, find_comment};
use crate::utils::post::{ensure_visible, find_post, find_post_for_share};
use crate::utils::visibility::comment_condition;

/// Load a comment the viewer may see, along with its post.
async fn find_visible_comment<C: ConnectionTrait>(
    db: &C,
    id: i32,
    viewer: Option<&Actor>,
) -> Result<(comment::Model, post::Model), AppError> {
    let comment = find_comment(db, id).await?;
    let post = find_post(db, comment.post_id).await?;
    if !CommentScope::for_viewer(viewer).admits(
        comment.is_approved,
        comment.author_id,
        post.author_id,
    ) {
        return Err(AppError::NotFound("Comment not found".into()));
    }
    Ok((comment, post))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List comments",
    description = "Returns a paginated list of comments, newest first. Anonymous callers see approved comments only; signed-in users also see their own comments and comments on their posts; admins see everything.",
    params(CommentListQuery),
    responses(
        (status = 200, description = "List of comments", body = CommentListResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_comments(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let actor = actor_of(&auth_user);

    let mut select = comment::Entity::find()
        .filter(comment_condition(CommentScope::for_viewer(actor.as_ref())));
    if let Some(post_id) = query.post {
        select = select.filter(comment::Column::PostId.eq(post_id));
    }
    if let Some(is_approved) = query.is_approved {
        select = select.filter(comment::Column::IsApproved.eq(is_approved));
    }

    let total = select.clone().count(&state.db).await?;
    let comments = select
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(CommentListResponse {
        data: build_responses(&state.db, comments).await?,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Comments",
    operation_id = "getComment",
    summary = "Get a comment by ID",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment details", body = CommentResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_comment(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CommentResponse>, AppError> {
    let actor = actor_of(&auth_user);
    let (comment, _) = find_visible_comment(&state.db, id, actor.as_ref()).await?;
    Ok(Json(build_response(&state.db, comment).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a post",
    description = "Adds a comment, or a reply when `parent_id` is given. New comments wait for approval by the post's author or an admin before they appear publicly.",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post or parent comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(post_id = payload.post_id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::CreateComment)?;
    validate_comment_content(&payload.content)?;
    let actor = auth_user.actor();

    let txn = state.db.begin().await?;
    let post = find_post_for_share(&txn, payload.post_id).await?;
    ensure_visible(&post, Some(&actor))?;
    if let Some(parent_id) = payload.parent_id {
        let (parent, _) = find_visible_comment(&txn, parent_id, Some(&actor)).await?;
        if parent.post_id != payload.post_id {
            return Err(AppError::Validation(
                "Parent comment must belong to the same post".into(),
            ));
        }
    }

    let now = chrono::Utc::now();
    let model = comment::ActiveModel {
        post_id: Set(payload.post_id),
        author_id: Set(auth_user.user_id),
        content: Set(payload.content.trim().to_string()),
        is_approved: Set(false),
        parent_id: Set(payload.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(build_response(&state.db, model).await?),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    description = "Replaces the comment text. Allowed for its author or an admin. The approval state is kept.",
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    validate_comment_content(&payload.content)?;

    let (existing, _) = find_visible_comment(&state.db, id, Some(&auth_user.actor())).await?;
    auth_user.require(Action::EditComment {
        author_id: existing.author_id,
    })?;

    let mut active: comment::ActiveModel = existing.into();
    active.content = Set(payload.content.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(build_response(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Deletes the comment and all replies below it. Allowed for its author or an admin.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let (existing, _) = find_visible_comment(&txn, id, Some(&auth_user.actor())).await?;
    auth_user.require(Action::DeleteComment {
        author_id: existing.author_id,
    })?;

    let removed = delete_comment_subtree(&txn, &existing).await?;
    txn.commit().await?;

    tracing::info!(comment_id = id, removed, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/approve",
    tag = "Comments",
    operation_id = "approveComment",
    summary = "Approve a comment",
    description = "Makes a pending comment publicly visible. Allowed for the author of the post it is on, or an admin. Approving twice is a no-op.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment approved", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn approve_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let (existing, post) = find_visible_comment(&state.db, id, Some(&auth_user.actor())).await?;
    auth_user.require(Action::ModerateComment {
        post_author_id: post.author_id,
    })?;

    if !existing.is_approved {
        comment::Entity::update_many()
            .col_expr(comment::Column::IsApproved, Expr::value(true))
            .filter(comment::Column::Id.eq(id))
            .exec(&state.db)
            .await?;
        tracing::info!(comment_id = id, post_id = post.id, "Comment approved");
    }

    Ok(Json(MessageResponse::new("Comment approved")))
}

#[utoipa::path(
    post,
    path = "/{id}/reject",
    tag = "Comments",
    operation_id = "rejectComment",
    summary = "Reject a comment",
    description = "Permanently deletes the comment together with its replies. Allowed for the author of the post it is on, or an admin.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment rejected and deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn reject_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (existing, post) = find_visible_comment(&txn, id, Some(&auth_user.actor())).await?;
    auth_user.require(Action::ModerateComment {
        post_author_id: post.author_id,
    })?;

    let removed = delete_comment_subtree(&txn, &existing).await?;
    txn.commit().await?;

    tracing::info!(comment_id = id, removed, "Comment rejected");
    Ok(Json(MessageResponse::new(
        "Comment rejected and deleted",
    )))
}

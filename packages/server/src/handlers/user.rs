use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Action, PostStatus};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{comment, post, post_like, share, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::post::PostListResponse;
use crate::models::shared::{PageQuery, Pagination, escape_like, page_offset, page_window};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::comment::delete_comment_subtree;
use crate::utils::post::{delete_posts_cascade, grouped_counts, post_page, published_post_count};

/// Look up a user by ID, returning 404 if not found.
async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Returns a paginated list of users ordered by ID. Requires authentication. `search` matches username or email case-insensitively.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require(Action::ReadUsers)?;
    let (page, per_page) = page_window(query.page, query.per_page);

    let mut select = user::Entity::find();
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    let total = select.clone().count(&state.db).await?;
    let users = select
        .order_by_asc(user::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let post_counts = grouped_counts::<post::Entity, _>(
        &state.db,
        &ids,
        post::Column::AuthorId,
        Condition::all().add(post::Column::Status.eq(PostStatus::Published)),
    )
    .await?;

    let data = users
        .into_iter()
        .map(|u| {
            let count = post_counts.get(&u.id).copied().unwrap_or(0);
            UserResponse::new(u, count)
        })
        .collect();

    Ok(Json(UserListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require(Action::ReadUsers)?;
    let user = find_user(&state.db, id).await?;
    let post_count = published_post_count(&state.db, id).await?;
    Ok(Json(UserResponse::new(user, post_count)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user profile",
    description = "Partially updates email and bio. Allowed for the user themselves or an admin. Changing `role` requires ADMIN. An empty payload returns the current profile unchanged.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require(Action::EditUser { user_id: id })?;
    validate_update_user(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_user(&txn, id).await?;

    if let Some(role) = payload.role
        && role != existing.role
    {
        auth_user.require(Action::ChangeUserRole)?;
    }

    let model = if payload == UpdateUserRequest::default() {
        existing
    } else {
        let mut active: user::ActiveModel = existing.into();
        if let Some(email) = payload.email {
            active.email = Set(email.trim().to_string());
        }
        if let Some(bio) = payload.bio {
            active.bio = Set(bio);
        }
        if let Some(role) = payload.role {
            active.role = Set(role);
        }
        active.update(&txn).await?
    };
    let post_count = published_post_count(&txn, id).await?;
    txn.commit().await?;

    Ok(Json(UserResponse::new(model, post_count)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    description = "Permanently deletes a user together with their posts (and everything attached to them), their comments and replies to them, their likes, and their shares. Allowed for the user themselves or an admin.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::DeleteUser { user_id: id })?;

    let txn = state.db.begin().await?;
    find_user(&txn, id).await?;

    let post_ids: Vec<i32> = post::Entity::find()
        .filter(post::Column::AuthorId.eq(id))
        .select_only()
        .column(post::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;
    delete_posts_cascade(&txn, &post_ids).await?;

    // Removing one comment may already have taken others with it as replies.
    let own_comments = comment::Entity::find()
        .filter(comment::Column::AuthorId.eq(id))
        .order_by_asc(comment::Column::Id)
        .all(&txn)
        .await?;
    for c in own_comments {
        if comment::Entity::find_by_id(c.id).one(&txn).await?.is_some() {
            delete_comment_subtree(&txn, &c).await?;
        }
    }

    post_like::Entity::delete_many()
        .filter(post_like::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    share::Entity::delete_many()
        .filter(share::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(user_id = id, deleted_posts = post_ids.len(), "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/posts",
    tag = "Users",
    operation_id = "listUserPosts",
    summary = "List a user's published posts",
    description = "Returns the user's published posts, newest first.",
    params(("id" = i32, Path, description = "User ID"), PageQuery),
    responses(
        (status = 200, description = "Published posts by the user", body = PostListResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    find_user(&state.db, id).await?;
    let (page, per_page) = page_window(query.page, query.per_page);

    let select = post::Entity::find()
        .filter(post::Column::AuthorId.eq(id))
        .filter(post::Column::Status.eq(PostStatus::Published))
        .order_by_desc(post::Column::PublishedAt)
        .order_by_desc(post::Column::Id);

    Ok(Json(post_page(&state.db, select, page, per_page).await?))
}

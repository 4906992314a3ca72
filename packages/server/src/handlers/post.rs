use sea_orm::sea_query::QueryStatementBuilder;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::lifecycle::resolve_excerpt;
use common::{
    Action, EngagementCounts, LikeOutcome, Lifecycle, PostScope, PostStatus, UnlikeOutcome,
};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr, NullOrdering, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{post, post_like, post_tag, share, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, actor_of};
use crate::extractors::json::AppJson;
use crate::models::engagement::*;
use crate::models::post::*;
use crate::models::shared::{escape_like, page_window};
use crate::state::AppState;
use crate::utils::post::{
    approved_comment_count, delete_posts_cascade, ensure_visible, find_post, find_post_for_update,
    find_visible_post, like_count, post_detail, post_page, resolve_tag_ids, set_post_tags,
};
use crate::utils::slug::{MAX_SLUG_ATTEMPTS, next_free_post_slug, post_slug_base};
use crate::utils::visibility::post_condition;

#[utoipa::path(
    get,
    path = "/",
    tag = "Posts",
    operation_id = "listPosts",
    summary = "List posts with filters, search and sorting",
    description = "Returns a paginated list of posts visible to the caller: published posts for anonymous callers and readers, plus their own posts for authors, and everything for admins. Supports case-insensitive search over title, content and tag names, filtering by `status`, `author` and `tag`, and sorting by `created_at` (default, desc), `published_at`, `view_count`, `like_count`, or `title`. Content is omitted.",
    params(PostListQuery),
    responses(
        (status = 200, description = "List of posts", body = PostListResponse),
        (status = 400, description = "Invalid sort field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_posts(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let actor = actor_of(&auth_user);

    let mut select =
        post::Entity::find().filter(post_condition(PostScope::for_viewer(actor.as_ref())));

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(post::Column::Title)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(post::Column::Content)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        post::Column::Id.in_subquery(
                            SeaQuery::select()
                                .column((post_tag::Entity, post_tag::Column::PostId))
                                .from(post_tag::Entity)
                                .inner_join(
                                    tag::Entity,
                                    Expr::col((tag::Entity, tag::Column::Id))
                                        .equals((post_tag::Entity, post_tag::Column::TagId)),
                                )
                                .and_where(
                                    Expr::expr(Func::lower(Expr::col((
                                        tag::Entity,
                                        tag::Column::Name,
                                    ))))
                                    .like(LikeExpr::new(pattern).escape('\\')),
                                )
                                .to_owned(),
                        ),
                    ),
            );
        }
    }
    if let Some(status) = query.status {
        select = select.filter(post::Column::Status.eq(status));
    }
    if let Some(author_id) = query.author {
        select = select.filter(post::Column::AuthorId.eq(author_id));
    }
    if let Some(tag_id) = query.tag {
        select = select.filter(
            post::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(post_tag::Column::PostId)
                    .from(post_tag::Entity)
                    .and_where(post_tag::Column::TagId.eq(tag_id))
                    .to_owned(),
            ),
        );
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => Some(post::Column::CreatedAt),
        "published_at" => Some(post::Column::PublishedAt),
        "view_count" => Some(post::Column::ViewCount),
        "title" => Some(post::Column::Title),
        "like_count" => None,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, published_at, view_count, like_count, title"
                    .into(),
            ));
        }
    };
    select = match sort_column {
        Some(column) => select.order_by_with_nulls(column, sort_order.clone(), NullOrdering::Last),
        None => select.order_by(like_count_expr(), sort_order.clone()),
    };
    select = select.order_by(post::Column::Id, sort_order);

    Ok(Json(post_page(&state.db, select, page, per_page).await?))
}

/// Correlated `COUNT(*)` of a post's likes, usable as an ordering key.
fn like_count_expr() -> Expr {
    let likes = SeaQuery::select()
        .expr(Func::count(Expr::col((post_like::Entity, post_like::Column::UserId))))
        .from(post_like::Entity)
        .and_where(
            Expr::col((post_like::Entity, post_like::Column::PostId))
                .equals((post::Entity, post::Column::Id)),
        )
        .to_owned();
    Expr::SubQuery(None, Box::new(likes.into_sub_query_statement()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Posts",
    operation_id = "createPost",
    summary = "Create a post",
    description = "Creates a post authored by the caller. Requires the AUTHOR or ADMIN role. The slug is derived from the title and suffixed with `-1`, `-2`, ... when taken. Status defaults to `DRAFT`; creating directly as `PUBLISHED` stamps `published_at` and fills an empty excerpt from the content.",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::CreatePost)?;
    validate_create_post(&payload)?;

    let now = chrono::Utc::now();
    let lifecycle =
        Lifecycle::new().transition(payload.status.unwrap_or_default(), now)?;
    let title = payload.title.trim().to_string();
    let excerpt = resolve_excerpt(
        lifecycle.status,
        payload.excerpt.as_deref().unwrap_or_default(),
        &payload.content,
    );
    let tag_ids = resolve_tag_ids(&state.db, &payload.tag_ids).await?;
    let base = post_slug_base(&title);

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let txn = state.db.begin().await?;
        let slug = next_free_post_slug(&txn, &base).await?;

        let new_post = post::ActiveModel {
            title: Set(title.clone()),
            slug: Set(slug.clone()),
            content: Set(payload.content.clone()),
            excerpt: Set(excerpt.clone()),
            author_id: Set(auth_user.user_id),
            status: Set(lifecycle.status),
            view_count: Set(0),
            share_count: Set(0),
            published_at: Set(lifecycle.published_at),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match new_post.insert(&txn).await {
            Ok(model) => {
                set_post_tags(&txn, model.id, &tag_ids).await?;
                txn.commit().await?;
                tracing::info!(post_id = model.id, slug = %model.slug, "Post created");
                let body = post_detail(&state.db, model, Some(auth_user.user_id)).await?;
                return Ok((StatusCode::CREATED, Json(body)));
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::debug!(attempt, %slug, "Slug claimed concurrently, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(format!(
        "No free slug for base '{base}' after {MAX_SLUG_ATTEMPTS} attempts"
    )))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    operation_id = "getPost",
    summary = "Get a post by ID",
    description = "Returns the post with its tags, engagement counts and approved comment threads, and counts one view. Posts the caller may not see are reported as not found.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostDetailResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_post(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetailResponse>, AppError> {
    let actor = actor_of(&auth_user);
    find_visible_post(&state.db, id, actor.as_ref()).await?;

    post::Entity::update_many()
        .col_expr(
            post::Column::ViewCount,
            Expr::col(post::Column::ViewCount).add(1),
        )
        .filter(post::Column::Id.eq(id))
        .exec(&state.db)
        .await?;

    let refreshed = find_post(&state.db, id).await?;
    let viewer_id = auth_user.as_ref().map(|u| u.user_id);
    Ok(Json(post_detail(&state.db, refreshed, viewer_id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Posts",
    operation_id = "updatePost",
    summary = "Update a post",
    description = "Partially updates a post. Allowed for its author or an admin. The slug never changes. `status` follows the forward-only lifecycle DRAFT → PUBLISHED → ARCHIVED; archiving needs the AUTHOR or ADMIN role. `tag_ids` replaces the whole tag set.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostDetailResponse),
        (status = 400, description = "Validation error or illegal status change (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Json<PostDetailResponse>, AppError> {
    validate_update_post(&payload)?;
    let actor = auth_user.actor();

    let txn = state.db.begin().await?;
    let existing = find_post_for_update(&txn, id).await?;
    ensure_visible(&existing, Some(&actor))?;
    auth_user.require(Action::EditPost {
        author_id: existing.author_id,
    })?;

    if payload == UpdatePostRequest::default() {
        txn.commit().await?;
        return Ok(Json(
            post_detail(&state.db, existing, Some(auth_user.user_id)).await?,
        ));
    }

    let mut lifecycle = Lifecycle {
        status: existing.status,
        published_at: existing.published_at,
    };
    if let Some(next) = payload.status {
        auth_user.require(Action::ChangePostStatus {
            author_id: existing.author_id,
            to: next,
        })?;
        lifecycle = lifecycle.transition(next, chrono::Utc::now())?;
    }

    let tag_ids = match payload.tag_ids {
        Some(ref ids) => Some(resolve_tag_ids(&txn, ids).await?),
        None => None,
    };

    let content = payload.content.unwrap_or_else(|| existing.content.clone());
    let excerpt = resolve_excerpt(
        lifecycle.status,
        payload.excerpt.as_deref().unwrap_or(&existing.excerpt),
        &content,
    );

    let mut active: post::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    active.content = Set(content);
    active.excerpt = Set(excerpt);
    active.status = Set(lifecycle.status);
    active.published_at = Set(lifecycle.published_at);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    if let Some(ref ids) = tag_ids {
        set_post_tags(&txn, id, ids).await?;
    }
    txn.commit().await?;

    Ok(Json(
        post_detail(&state.db, model, Some(auth_user.user_id)).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Posts",
    operation_id = "deletePost",
    summary = "Delete a post",
    description = "Permanently deletes a post with its comments, likes, shares and tag links. Allowed for its author or an admin.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_post_for_update(&txn, id).await?;
    ensure_visible(&existing, Some(&auth_user.actor()))?;
    auth_user.require(Action::DeletePost {
        author_id: existing.author_id,
    })?;

    delete_posts_cascade(&txn, &[id]).await?;
    txn.commit().await?;

    tracing::info!(post_id = id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn change_status(
    auth_user: &AuthUser,
    state: &AppState,
    id: i32,
    to: PostStatus,
) -> Result<PostDetailResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_post_for_update(&txn, id).await?;
    ensure_visible(&existing, Some(&auth_user.actor()))?;
    auth_user.require(Action::ChangePostStatus {
        author_id: existing.author_id,
        to,
    })?;

    let lifecycle = Lifecycle {
        status: existing.status,
        published_at: existing.published_at,
    }
    .transition(to, chrono::Utc::now())?;
    let excerpt = resolve_excerpt(lifecycle.status, &existing.excerpt, &existing.content);

    let mut active: post::ActiveModel = existing.into();
    active.status = Set(lifecycle.status);
    active.published_at = Set(lifecycle.published_at);
    active.excerpt = Set(excerpt);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(post_id = id, status = %to, "Post status changed");
    post_detail(&state.db, model, Some(auth_user.user_id)).await
}

#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "Posts",
    operation_id = "publishPost",
    summary = "Publish a post",
    description = "Moves a draft to PUBLISHED. `published_at` is set the first time only. Publishing an already published post is a no-op. Archived posts cannot be republished.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post published", body = PostDetailResponse),
        (status = 400, description = "Illegal status change (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn publish_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetailResponse>, AppError> {
    Ok(Json(
        change_status(&auth_user, &state, id, PostStatus::Published).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/archive",
    tag = "Posts",
    operation_id = "archivePost",
    summary = "Archive a post",
    description = "Moves a post to ARCHIVED, which is final. Requires the AUTHOR or ADMIN role and ownership of the post (or ADMIN).",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post archived", body = PostDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn archive_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetailResponse>, AppError> {
    Ok(Json(
        change_status(&auth_user, &state, id, PostStatus::Archived).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Posts",
    operation_id = "likePost",
    summary = "Like a post",
    description = "Records a like by the caller. Liking twice is harmless: the second call returns 200 with outcome `already_liked`.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 201, description = "Like recorded", body = LikeResponse),
        (status = 200, description = "Already liked", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn like_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::Engage)?;
    find_visible_post(&state.db, id, Some(&auth_user.actor())).await?;

    let like = post_like::ActiveModel {
        user_id: Set(auth_user.user_id),
        post_id: Set(id),
        created_at: Set(chrono::Utc::now()),
    };
    let result = post_like::Entity::insert(like)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                post_like::Column::UserId,
                post_like::Column::PostId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await;

    let inserted = match result {
        Ok(rows) => rows > 0,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) => return Err(e.into()),
    };
    let outcome = LikeOutcome::from_inserted(inserted);
    let count = like_count(&state.db, id).await?;

    let status = match outcome {
        LikeOutcome::Created => StatusCode::CREATED,
        LikeOutcome::AlreadyLiked => StatusCode::OK,
    };
    Ok((status, Json(LikeResponse::new(outcome, count))))
}

#[utoipa::path(
    post,
    path = "/{id}/unlike",
    tag = "Posts",
    operation_id = "unlikePost",
    summary = "Remove a like",
    description = "Removes the caller's like. When there was nothing to remove the response is 400 with outcome `not_liked` and the current like count.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like removed", body = UnlikeResponse),
        (status = 400, description = "Post was not liked", body = UnlikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn unlike_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::Engage)?;
    find_visible_post(&state.db, id, Some(&auth_user.actor())).await?;

    let res = post_like::Entity::delete_by_id((auth_user.user_id, id))
        .exec(&state.db)
        .await?;
    let outcome = UnlikeOutcome::from_removed(res.rows_affected);
    let count = like_count(&state.db, id).await?;

    let status = match outcome {
        UnlikeOutcome::Removed => StatusCode::OK,
        UnlikeOutcome::NotLiked => StatusCode::BAD_REQUEST,
    };
    Ok((status, Json(UnlikeResponse::new(outcome, count))))
}

#[utoipa::path(
    post,
    path = "/{id}/share",
    tag = "Posts",
    operation_id = "sharePost",
    summary = "Share a post",
    description = "Records a share by the caller and bumps the post's share counter. `platform` is optional free text.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = ShareRequest,
    responses(
        (status = 201, description = "Share recorded", body = ShareResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn share_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ShareRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::Engage)?;
    validate_share_request(&payload)?;

    let txn = state.db.begin().await?;
    find_visible_post(&txn, id, Some(&auth_user.actor())).await?;

    share::ActiveModel {
        user_id: Set(auth_user.user_id),
        post_id: Set(id),
        platform: Set(payload.platform.unwrap_or_default().trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    post::Entity::update_many()
        .col_expr(
            post::Column::ShareCount,
            Expr::col(post::Column::ShareCount).add(1),
        )
        .filter(post::Column::Id.eq(id))
        .exec(&txn)
        .await?;

    let share_count = find_post(&txn, id).await?.share_count;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ShareResponse {
            message: "Post shared successfully".into(),
            share_count,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/analytics",
    tag = "Posts",
    operation_id = "getPostAnalytics",
    summary = "Engagement analytics for a post",
    description = "Returns view, like, approved comment and share counts with the engagement rate `(likes + comments + shares) / views * 100`. Only the post's author and admins may see them.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post analytics", body = AnalyticsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn post_analytics(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let post = find_visible_post(&state.db, id, Some(&auth_user.actor())).await?;
    auth_user.require(Action::ViewAnalytics {
        author_id: post.author_id,
    })?;

    let like_count = like_count(&state.db, id).await?;
    let comment_count = approved_comment_count(&state.db, id).await?;
    let counts = EngagementCounts {
        views: std::cmp::Ord::max(post.view_count, 0) as u64,
        likes: like_count,
        approved_comments: comment_count,
        shares: std::cmp::Ord::max(post.share_count, 0) as u64,
    };

    Ok(Json(AnalyticsResponse {
        post_id: post.id,
        view_count: post.view_count,
        like_count,
        comment_count,
        share_count: post.share_count,
        engagement_rate: counts.engagement_rate(),
    }))
}

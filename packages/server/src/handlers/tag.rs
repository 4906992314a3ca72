use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Action, PostStatus};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{post, post_tag, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::post::PostListResponse;
use crate::models::shared::{PageQuery, Pagination, escape_like, page_offset, page_window};
use crate::models::tag::*;
use crate::state::AppState;
use crate::utils::post::{grouped_counts, post_page};
use crate::utils::slug::tag_slug;

async fn find_tag<C: ConnectionTrait>(db: &C, id: i32) -> Result<tag::Model, AppError> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))
}

/// Links from `tag_id` to published posts only.
fn published_link_filter() -> Condition {
    Condition::all().add(
        post_tag::Column::PostId.in_subquery(
            SeaQuery::select()
                .column(post::Column::Id)
                .from(post::Entity)
                .and_where(post::Column::Status.eq(PostStatus::Published))
                .to_owned(),
        ),
    )
}

async fn published_post_counts<C: ConnectionTrait>(
    db: &C,
    tag_ids: &[i32],
) -> Result<std::collections::HashMap<i32, u64>, DbErr> {
    grouped_counts::<post_tag::Entity, _>(
        db,
        tag_ids,
        post_tag::Column::TagId,
        published_link_filter(),
    )
    .await
}

async fn tag_response<C: ConnectionTrait>(db: &C, tag: tag::Model) -> Result<TagResponse, AppError> {
    let count = published_post_counts(db, &[tag.id])
        .await?
        .get(&tag.id)
        .copied()
        .unwrap_or(0);
    Ok(TagResponse::new(tag, count))
}

fn map_unique_violation(e: DbErr) -> AppError {
    AppError::conflict_on_unique(e, "A tag with this name already exists")
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Tags",
    operation_id = "listTags",
    summary = "List tags",
    description = "Returns a paginated list of tags ordered by name. `search` matches the name case-insensitively.",
    params(TagListQuery),
    responses(
        (status = 200, description = "List of tags", body = TagListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<TagListQuery>,
) -> Result<Json<TagListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);

    let mut select = tag::Entity::find();
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(tag::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select.clone().count(&state.db).await?;
    let tags = select
        .order_by_asc(tag::Column::Name)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
    let counts = published_post_counts(&state.db, &ids).await?;
    let data = tags
        .into_iter()
        .map(|t| {
            let count = counts.get(&t.id).copied().unwrap_or(0);
            TagResponse::new(t, count)
        })
        .collect();

    Ok(Json(TagListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tags",
    operation_id = "getTag",
    summary = "Get a tag by ID",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag details", body = TagResponse),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = find_tag(&state.db, id).await?;
    Ok(Json(tag_response(&state.db, tag).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tags",
    operation_id = "createTag",
    summary = "Create a tag",
    description = "Creates a tag. The slug is derived from the name once and kept on rename. Requires the AUTHOR or ADMIN role.",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name or slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_tag(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::ManageTag)?;
    validate_tag_name(&payload.name)?;

    let name = payload.name.trim().to_string();
    let slug = tag_slug(&name)?;

    let model = tag::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(map_unique_violation)?;

    Ok((StatusCode::CREATED, Json(TagResponse::new(model, 0))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Tags",
    operation_id = "updateTag",
    summary = "Rename a tag",
    description = "Changes the tag name. The slug is left as it was. Requires the AUTHOR or ADMIN role.",
    params(("id" = i32, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_tag(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    auth_user.require(Action::ManageTag)?;
    if let Some(ref name) = payload.name {
        validate_tag_name(name)?;
    }

    let existing = find_tag(&state.db, id).await?;
    let model = match payload.name {
        Some(name) => {
            let mut active: tag::ActiveModel = existing.into();
            active.name = Set(name.trim().to_string());
            active
                .update(&state.db)
                .await
                .map_err(map_unique_violation)?
        }
        None => existing,
    };

    Ok(Json(tag_response(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Tags",
    operation_id = "deleteTag",
    summary = "Delete a tag",
    description = "Deletes the tag and detaches it from every post. Posts themselves are kept. Requires the AUTHOR or ADMIN role.",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_tag(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Action::ManageTag)?;

    let txn = state.db.begin().await?;
    find_tag(&txn, id).await?;
    post_tag::Entity::delete_many()
        .filter(post_tag::Column::TagId.eq(id))
        .exec(&txn)
        .await?;
    tag::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/posts",
    tag = "Tags",
    operation_id = "listTagPosts",
    summary = "List published posts carrying a tag",
    params(("id" = i32, Path, description = "Tag ID"), PageQuery),
    responses(
        (status = 200, description = "Published posts with the tag", body = PostListResponse),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn list_tag_posts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    find_tag(&state.db, id).await?;
    let (page, per_page) = page_window(query.page, query.per_page);

    let select = post::Entity::find()
        .filter(post::Column::Status.eq(PostStatus::Published))
        .filter(
            post::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(post_tag::Column::PostId)
                    .from(post_tag::Entity)
                    .and_where(post_tag::Column::TagId.eq(id))
                    .to_owned(),
            ),
        )
        .order_by_desc(post::Column::PublishedAt)
        .order_by_desc(post::Column::Id);

    Ok(Json(post_page(&state.db, select, page, per_page).await?))
}

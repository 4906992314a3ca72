use std::collections::{HashMap, HashSet};

use common::{Actor, PostScope};
use sea_orm::sea_query::{Expr, Func, LockType};
use sea_orm::*;

use super::comment::approved_feed;
use crate::entity::{comment, post, post_like, post_tag, share, tag, user};
use crate::error::AppError;
use crate::models::post::{PostDetailResponse, PostListItem, PostListResponse};
use crate::models::shared::{Pagination, page_offset};
use crate::models::tag::TagSummary;
use crate::models::user::AuthorSummary;

/// Look up a post by ID, returning 404 if not found.
pub async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Look up a post by ID with a row lock held until the transaction ends.
pub async fn find_post_for_update<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Look up a post with a shared row lock. Comment inserts take it so they
/// cannot interleave with a subtree delete on the same post.
pub async fn find_post_for_share<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .lock(LockType::Share)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Look up a post the viewer is allowed to see. Hidden posts are reported as
/// missing so drafts don't leak their existence.
pub async fn find_visible_post<C: ConnectionTrait>(
    db: &C,
    id: i32,
    viewer: Option<&Actor>,
) -> Result<post::Model, AppError> {
    let post = find_post(db, id).await?;
    ensure_visible(&post, viewer)?;
    Ok(post)
}

pub fn ensure_visible(post: &post::Model, viewer: Option<&Actor>) -> Result<(), AppError> {
    if PostScope::for_viewer(viewer).admits(post.status, post.author_id) {
        Ok(())
    } else {
        Err(AppError::NotFound("Post not found".into()))
    }
}

pub async fn like_count<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<u64, DbErr> {
    post_like::Entity::find()
        .filter(post_like::Column::PostId.eq(post_id))
        .count(db)
        .await
}

pub async fn approved_comment_count<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
) -> Result<u64, DbErr> {
    comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .filter(comment::Column::IsApproved.eq(true))
        .count(db)
        .await
}

pub async fn has_liked<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    post_id: i32,
) -> Result<bool, DbErr> {
    Ok(post_like::Entity::find_by_id((user_id, post_id))
        .one(db)
        .await?
        .is_some())
}

/// Tags attached to a post, ordered by name.
pub async fn tags_of<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<Vec<TagSummary>, DbErr> {
    let mut tags = tags_by_post(db, &[post_id]).await?;
    Ok(tags.remove(&post_id).unwrap_or_default())
}

/// Count rows of `E` matching `filter`, grouped by `key` and restricted to
/// the given key values.
pub async fn grouped_counts<E, C>(
    db: &C,
    keys: &[i32],
    key: E::Column,
    filter: Condition,
) -> Result<HashMap<i32, u64>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if keys.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = E::find()
        .select_only()
        .column(key)
        .column_as(Expr::expr(Func::count(Expr::col(key))), "count")
        .filter(key.is_in(keys.to_vec()))
        .filter(filter)
        .group_by(key)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, std::cmp::Ord::max(count, 0) as u64))
        .collect())
}

async fn tags_by_post<C: ConnectionTrait>(
    db: &C,
    post_ids: &[i32],
) -> Result<HashMap<i32, Vec<TagSummary>>, DbErr> {
    let links = post_tag::Entity::find()
        .filter(post_tag::Column::PostId.is_in(post_ids.to_vec()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(HashMap::new());
    }

    let tag_ids: HashSet<i32> = links.iter().map(|l| l.tag_id).collect();
    let tags: HashMap<i32, tag::Model> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut out: HashMap<i32, Vec<TagSummary>> = HashMap::new();
    for link in links {
        if let Some(tag) = tags.get(&link.tag_id) {
            out.entry(link.post_id)
                .or_default()
                .push(TagSummary::from(tag.clone()));
        }
    }
    for list in out.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(out)
}

/// Authors keyed by user ID.
pub async fn authors_by_id<C: ConnectionTrait>(
    db: &C,
    user_ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, AuthorSummary>, DbErr> {
    let ids: HashSet<i32> = user_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .iter()
        .map(|u| (u.id, AuthorSummary::from(u)))
        .collect())
}

/// Attach authors, tags, and engagement counts to a page of posts, keeping
/// the input order.
pub async fn build_list_items<C: ConnectionTrait>(
    db: &C,
    posts: Vec<post::Model>,
) -> Result<Vec<PostListItem>, AppError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();

    let authors = authors_by_id(db, posts.iter().map(|p| p.author_id)).await?;
    let mut tags = tags_by_post(db, &ids).await?;
    let likes =
        grouped_counts::<post_like::Entity, _>(db, &ids, post_like::Column::PostId, Condition::all())
            .await?;
    let comments = grouped_counts::<comment::Entity, _>(
        db,
        &ids,
        comment::Column::PostId,
        Condition::all().add(comment::Column::IsApproved.eq(true)),
    )
    .await?;

    posts
        .into_iter()
        .map(|p| -> Result<PostListItem, AppError> {
            let author = authors
                .get(&p.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Author of post {} missing", p.id)))?;
            Ok(PostListItem {
                author,
                tags: tags.remove(&p.id).unwrap_or_default(),
                like_count: likes.get(&p.id).copied().unwrap_or(0),
                comment_count: comments.get(&p.id).copied().unwrap_or(0),
                id: p.id,
                title: p.title,
                slug: p.slug,
                excerpt: p.excerpt,
                status: p.status,
                view_count: p.view_count,
                share_count: p.share_count,
                created_at: p.created_at,
                published_at: p.published_at,
            })
        })
        .collect()
}

/// Check every tag ID exists, returning them deduplicated.
pub async fn resolve_tag_ids<C: ConnectionTrait>(
    db: &C,
    tag_ids: &[i32],
) -> Result<Vec<i32>, AppError> {
    let wanted: HashSet<i32> = tag_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }
    let found: HashSet<i32> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(wanted.clone()))
        .select_only()
        .column(tag::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
        return Err(AppError::Validation(format!("Tag {missing} does not exist")));
    }
    let mut ids: Vec<i32> = wanted.into_iter().collect();
    ids.sort_unstable();
    Ok(ids)
}

/// Replace the tag set of a post.
pub async fn set_post_tags<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    post_tag::Entity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .exec(db)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }
    let links = tag_ids.iter().map(|&tag_id| post_tag::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(tag_id),
    });
    post_tag::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Delete posts together with their comments, likes, shares, and tag links.
pub async fn delete_posts_cascade<C: ConnectionTrait>(
    db: &C,
    post_ids: &[i32],
) -> Result<(), DbErr> {
    if post_ids.is_empty() {
        return Ok(());
    }
    let ids = post_ids.to_vec();

    // Blocks comment writers on these posts until the cascade commits.
    post::Entity::find()
        .filter(post::Column::Id.is_in(ids.clone()))
        .lock(LockType::Update)
        .all(db)
        .await?;

    comment::Entity::delete_many()
        .filter(comment::Column::PostId.is_in(ids.clone()))
        .exec(db)
        .await?;
    post_like::Entity::delete_many()
        .filter(post_like::Column::PostId.is_in(ids.clone()))
        .exec(db)
        .await?;
    share::Entity::delete_many()
        .filter(share::Column::PostId.is_in(ids.clone()))
        .exec(db)
        .await?;
    post_tag::Entity::delete_many()
        .filter(post_tag::Column::PostId.is_in(ids.clone()))
        .exec(db)
        .await?;
    post::Entity::delete_many()
        .filter(post::Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(())
}

/// Number of published posts written by a user.
pub async fn published_post_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    post::Entity::find()
        .filter(post::Column::AuthorId.eq(user_id))
        .filter(post::Column::Status.eq(common::PostStatus::Published))
        .count(db)
        .await
}

/// Run an already filtered and ordered post query for one page.
pub async fn post_page<C: ConnectionTrait>(
    db: &C,
    select: Select<post::Entity>,
    page: u64,
    per_page: u64,
) -> Result<PostListResponse, AppError> {
    let total = select.clone().count(db).await?;
    let posts = select
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?;

    Ok(PostListResponse {
        data: build_list_items(db, posts).await?,
        pagination: Pagination::new(page, per_page, total),
    })
}

/// Full representation of one post. `viewer_id` decides `is_liked`.
pub async fn post_detail<C: ConnectionTrait>(
    db: &C,
    post: post::Model,
    viewer_id: Option<i32>,
) -> Result<PostDetailResponse, AppError> {
    let author = user::Entity::find_by_id(post.author_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Author of post {} missing", post.id)))?;
    let is_liked = match viewer_id {
        Some(user_id) => has_liked(db, user_id, post.id).await?,
        None => false,
    };

    Ok(PostDetailResponse {
        author: AuthorSummary::from(&author),
        tags: tags_of(db, post.id).await?,
        like_count: like_count(db, post.id).await?,
        comment_count: approved_comment_count(db, post.id).await?,
        comments: approved_feed(db, post.id).await?,
        is_liked,
        id: post.id,
        title: post.title,
        slug: post.slug,
        content: post.content,
        excerpt: post.excerpt,
        status: post.status,
        view_count: post.view_count,
        share_count: post.share_count,
        created_at: post.created_at,
        updated_at: post.updated_at,
        published_at: post.published_at,
    })
}

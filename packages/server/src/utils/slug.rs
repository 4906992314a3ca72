use std::collections::HashSet;

use common::slug::{disambiguate, slugify};
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, Condition, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::post;
use crate::error::AppError;
use crate::models::shared::escape_like;

/// Used when a title contains nothing slug-worthy.
pub const FALLBACK_POST_SLUG: &str = "post";

/// Inserting under a freshly computed slug can still lose a race against a
/// concurrent insert; callers retry this many times before giving up.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Base slug for a post title, before collision handling.
pub fn post_slug_base(title: &str) -> String {
    let base = slugify(title);
    if base.is_empty() {
        FALLBACK_POST_SLUG.to_string()
    } else {
        base
    }
}

/// First free slug among `base`, `base-1`, `base-2`, ...
pub async fn next_free_post_slug<C: ConnectionTrait>(
    db: &C,
    base: &str,
) -> Result<String, AppError> {
    let pattern = format!("{}-%", escape_like(base));
    let taken: HashSet<String> = post::Entity::find()
        .filter(
            Condition::any()
                .add(post::Column::Slug.eq(base))
                .add(Expr::col(post::Column::Slug).like(LikeExpr::new(pattern).escape('\\'))),
        )
        .select_only()
        .column(post::Column::Slug)
        .into_tuple::<String>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(disambiguate(base, |candidate| taken.contains(candidate)))
}

/// Slug for a new tag. Names without any slug-worthy character are rejected.
pub fn tag_slug(name: &str) -> Result<String, AppError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Tag name must contain at least one letter or digit".into(),
        ));
    }
    Ok(slug)
}

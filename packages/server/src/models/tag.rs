use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_length};
use crate::entity::tag;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTagRequest {
    /// Unique tag name (1-50 characters).
    #[schema(example = "Rust")]
    pub name: String,
}

/// Renaming keeps the original slug.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
}

pub fn validate_tag_name(name: &str) -> Result<(), AppError> {
    validate_length(name.trim(), "Tag name", 1, Some(50))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Rust")]
    pub name: String,
    #[schema(example = "rust")]
    pub slug: String,
    /// Number of published posts carrying this tag.
    #[schema(example = 12)]
    pub post_count: u64,
}

impl TagResponse {
    pub fn new(tag: tag::Model, post_count: u64) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            post_count,
        }
    }
}

/// Tag reference embedded in posts.
#[derive(Serialize, Clone, FromQueryResult, utoipa::ToSchema)]
pub struct TagSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<tag::Model> for TagSummary {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the tag name.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagListResponse {
    pub data: Vec<TagResponse>,
    pub pagination: Pagination,
}

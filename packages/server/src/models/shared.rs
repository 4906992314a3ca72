use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

const MAX_PER_PAGE: u64 = 100;

/// Largest page number honoured. Keeps the row offset within Postgres' signed
/// 64-bit `OFFSET`.
const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

/// Normalize `page`/`per_page` query values: pages start at 1, at most 100 per page.
pub fn page_window(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// Row offset of a window returned by [`page_window`].
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate that `value` has between `min` and `max` Unicode characters
/// (inclusive; `max = None` means unbounded).
pub fn validate_length(
    value: &str,
    field: &str,
    min: usize,
    max: Option<usize>,
) -> Result<(), AppError> {
    let len = value.chars().count();
    let too_long = max.is_some_and(|max| len > max);
    if len < min || too_long {
        let message = match max {
            Some(max) => format!("{field} must be {min}-{max} characters"),
            None => format!("{field} must be at least {min} characters"),
        };
        return Err(AppError::Validation(message));
    }
    Ok(())
}

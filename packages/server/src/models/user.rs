use chrono::{DateTime, Utc};
use common::Role;
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::entity::user;
use crate::error::AppError;

/// Public profile of a user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub role: Role,
    pub bio: String,
    /// Number of published posts by this user.
    #[schema(example = 3)]
    pub post_count: u64,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: user::Model, post_count: u64) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            bio: user.bio,
            post_count,
            created_at: user.created_at,
        }
    }
}

/// Compact author reference embedded in posts and comments.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct AuthorSummary {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
}

impl From<&user::Model> for AuthorSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Partial profile update. Only admins may change `role`.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref email) = payload.email {
        super::auth::validate_email(email)?;
    }
    if let Some(ref bio) = payload.bio
        && bio.chars().count() > 2000
    {
        return Err(AppError::Validation(
            "Bio must be at most 2000 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on username or email.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

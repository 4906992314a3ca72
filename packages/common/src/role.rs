#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role governing every authorization decision.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access to every resource.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ADMIN"))]
    Admin,
    /// May write posts and manage tags.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "AUTHOR"))]
    Author,
    /// Reads, comments and engages with published posts.
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "READER"))]
    Reader,
}

impl Role {
    pub const ALL: &'static [Role] = &[Self::Admin, Self::Author, Self::Reader];

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Authors and admins may create posts, archive posts and manage tags.
    pub fn can_author(&self) -> bool {
        match self {
            Self::Admin | Self::Author => true,
            Self::Reader => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Author => "AUTHOR",
            Self::Reader => "READER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role '{invalid}'. Valid values: ADMIN, AUTHOR, READER")]
pub struct ParseRoleError {
    invalid: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "AUTHOR" => Ok(Self::Author),
            "READER" => Ok(Self::Reader),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}

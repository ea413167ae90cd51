use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::user::AuthorSummary;

pub(crate) mod auth;
pub(crate) mod chat;
pub(crate) mod comments;
pub(crate) mod email;
pub(crate) mod i18n;
pub(crate) mod otp;
pub(crate) mod posts;
pub(crate) mod timeline;
pub(crate) mod users;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub(crate) struct PaginationQuery {
    /// Items per page; clamped to the endpoint maximum.
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) name: String,
    pub(crate) avatar_url: Option<String>,
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id,
            username: author.username,
            name: author.name,
            avatar_url: author.avatar_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DeletedDto {
    pub(crate) id: i64,
}

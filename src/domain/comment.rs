use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::{Pagination, PostAuthor};

/// A comment as listed on the comments pages, with its author and the
/// post it belongs to inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: PostAuthor,
    pub post: CommentPostRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPostRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedComments {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Newest,
    Oldest,
}

impl CommentSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSort::Newest => "newest",
            CommentSort::Oldest => "oldest",
        }
    }
}

/// Optional query parameters for the comment list endpoints. Unset
/// fields are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<CommentSort>,
    pub search: Option<String>,
}

impl CommentFilters {
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if let Some(page) = self.page {
            params.push(format!("page={page}"));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(sort) = self.sort {
            params.push(format!("sort={}", sort.as_str()));
        }
        if let Some(search) = &self.search {
            params.push(format!("search={search}"));
        }
        params.join("&")
    }
}

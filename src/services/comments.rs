use std::sync::Arc;

use serde::Serialize;

use crate::domain::{CommentFilters, PaginatedComments};
use crate::errors::ApiError;
use crate::services::ApiClient;

#[derive(Serialize)]
struct BulkDeleteBody<'a> {
    #[serde(rename = "commentIds")]
    comment_ids: &'a [String],
}

/// Typed wrapper over the comment endpoints.
pub struct CommentsService {
    api: Arc<ApiClient>,
}

impl CommentsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// All comments across the author's posts.
    pub async fn list_all(&self, filters: &CommentFilters) -> Result<PaginatedComments, ApiError> {
        self.api
            .get_json(&format!(
                "/comments/author/all?{}",
                filters.to_query_string()
            ))
            .await
    }

    /// Comments on a single post.
    pub async fn for_post(
        &self,
        post_id: &str,
        filters: &CommentFilters,
    ) -> Result<PaginatedComments, ApiError> {
        self.api
            .get_json(&format!(
                "/comments/posts/{post_id}?{}",
                filters.to_query_string()
            ))
            .await
    }

    pub async fn delete(&self, comment_id: &str) -> Result<(), ApiError> {
        self.api.delete(&format!("/comments/{comment_id}")).await
    }

    /// Bulk deletion used by the comments page's multi-select.
    pub async fn delete_many(&self, comment_ids: &[String]) -> Result<(), ApiError> {
        self.api
            .post_unit("/comments/bulk-delete", &BulkDeleteBody { comment_ids })
            .await
    }
}

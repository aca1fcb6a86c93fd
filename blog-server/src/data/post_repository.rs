use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) created_date: DateTime<Utc>,
    pub(crate) published_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Writes every mutable field of `post`. Returns `None` when the row is gone.
    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// Posts with `published_date <= now`, newest publication first, ties by id desc.
    async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError>;
    /// Unpublished posts of one author, newest `created_date` first.
    async fn list_drafts(&self, author_id: i64) -> Result<Vec<Post>, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        (**self).update_post(post).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }

    async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        (**self).list_published(now).await
    }

    async fn list_drafts(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        (**self).list_drafts(author_id).await
    }
}

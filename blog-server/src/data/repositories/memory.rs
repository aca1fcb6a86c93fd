use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::post_repository::{NewPost, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;

/// Process-local store backing both repositories.
///
/// Mirrors the Postgres schema rules: usernames are unique, a post needs an
/// existing author, and removing a user removes their posts.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_user_id: i64,
    next_post_id: i64,
    users: BTreeMap<i64, UserCredentials>,
    posts: BTreeMap<i64, Post>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.inner
            .lock()
            .map_err(|_| DomainError::Persistence("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state()?;
        if !state.users.contains_key(&input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }

        state.next_post_id += 1;
        let post = Post::new(
            state.next_post_id,
            input.author_id,
            input.title,
            input.text,
            input.created_date,
            input.published_date,
        )?;
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.state()?.posts.get(&id).cloned())
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let mut state = self.state()?;
        let Some(stored) = state.posts.get_mut(&post.id) else {
            return Ok(None);
        };
        stored.title.clone_from(&post.title);
        stored.text.clone_from(&post.text);
        stored.published_date = post.published_date;
        Ok(Some(stored.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.state()?.posts.remove(&id).is_some())
    }

    async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        let state = self.state()?;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| post.is_visible_at(now))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.published_date
                .cmp(&a.published_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(posts)
    }

    async fn list_drafts(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        let state = self.state()?;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| post.author_id == author_id && post.is_draft())
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.created_date
                .cmp(&a.created_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(posts)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.state()?;
        if state
            .users
            .values()
            .any(|creds| creds.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }

        state.next_user_id += 1;
        let user = User::new(state.next_user_id, input.username, input.email, Utc::now())?;
        state.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|creds| creds.user.username == username)
            .cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.posts.retain(|_, post| post.author_id != id);
        Ok(true)
    }
}

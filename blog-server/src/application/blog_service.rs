use std::sync::Arc;

use tracing::{debug, info};

use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::infrastructure::clock::Clock;

pub(crate) struct BlogService<R: PostRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: PostRepository> BlogService<R> {
    pub(crate) fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Creates a draft owned by `author_id`.
    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            author_id,
            title: req.title,
            text: req.text,
            created_date: self.clock.now(),
            published_date: None,
        };
        let post = self.repo.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "draft created");
        Ok(post)
    }

    /// Returns a post only if a reader can currently see it.
    pub(crate) async fn get_visible_post(&self, id: i64) -> Result<Post, DomainError> {
        let now = self.clock.now();
        self.repo
            .get_post(id)
            .await?
            .filter(|post| post.is_visible_at(now))
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let mut post = self.owned_post(actor_user_id, post_id).await?;

        post.title = req.title;
        post.text = req.text;
        self.save(&post).await
    }

    /// Sets `published_date` to the clock's current value and persists it.
    ///
    /// Publishing an already published post moves its date to the new value.
    pub(crate) async fn publish_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<Post, DomainError> {
        let mut post = self.owned_post(actor_user_id, post_id).await?;

        let now = self.clock.now();
        post.publish(now);
        let post = self.save(&post).await?;

        info!(post_id, published_date = %now, "post published");
        Ok(post)
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        self.owned_post(actor_user_id, post_id).await?;

        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::post_not_found(post_id));
        }
        info!(post_id, "post deleted");
        Ok(())
    }

    /// Published posts visible right now, most recently published first.
    pub(crate) async fn list_published(&self) -> Result<Vec<Post>, DomainError> {
        let now = self.clock.now();
        let posts = self.repo.list_published(now).await?;
        debug!(count = posts.len(), %now, "published posts listed");
        Ok(posts)
    }

    pub(crate) async fn list_drafts(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        self.repo.list_drafts(author_id).await
    }

    async fn owned_post(&self, actor_user_id: i64, post_id: i64) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;

        if post.author_id != actor_user_id {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    async fn save(&self, post: &Post) -> Result<Post, DomainError> {
        self.repo
            .update_post(post)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post.id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::BlogService;
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
    use crate::infrastructure::clock::FixedClock;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    #[derive(Clone, Default)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<NewPost>>>,
        post_for_get: Arc<Mutex<Option<Post>>>,
        updates: Arc<Mutex<Vec<Post>>>,
        list_now: Arc<Mutex<Option<DateTime<Utc>>>>,
        fail_update: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Post::new(
                1,
                input.author_id,
                input.title,
                input.text,
                input.created_date,
                input.published_date,
            )
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
            if *self.fail_update.lock().expect("fail_update mutex poisoned") {
                return Err(DomainError::Persistence("connection reset".to_string()));
            }
            self.updates
                .lock()
                .expect("updates mutex poisoned")
                .push(post.clone());
            Ok(Some(post.clone()))
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(true)
        }

        async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
            *self.list_now.lock().expect("list_now mutex poisoned") = Some(now);
            Ok(Vec::new())
        }

        async fn list_drafts(&self, _author_id: i64) -> Result<Vec<Post>, DomainError> {
            Ok(Vec::new())
        }
    }

    impl FakePostRepo {
        fn with_post(post: Post) -> Self {
            let repo = Self::default();
            *repo
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned") = Some(post);
            repo
        }

        fn update_count(&self) -> usize {
            self.updates.lock().expect("updates mutex poisoned").len()
        }
    }

    fn draft(id: i64, author_id: i64) -> Post {
        Post::new(id, author_id, "Test", "superText", at(2020, 1, 1), None)
            .expect("sample post must be valid")
    }

    fn service_with<R: PostRepository>(repo: R, now: DateTime<Utc>) -> (BlogService<R>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(now));
        (BlogService::new(repo, clock.clone()), clock)
    }

    #[tokio::test]
    async fn create_post_stores_draft_with_clock_creation_date() {
        let repo = FakePostRepo::default();
        let (service, _) = service_with(repo.clone(), at(2020, 2, 2));

        let created = service
            .create_post(
                10,
                CreatePostRequest {
                    title: "  Test  ".to_string(),
                    text: "superText".to_string(),
                },
            )
            .await
            .expect("create_post must succeed");

        assert_eq!(created.title, "Test");
        assert!(created.is_draft());

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.author_id, 10);
        assert_eq!(input.created_date, at(2020, 2, 2));
        assert_eq!(input.published_date, None);
    }

    #[tokio::test]
    async fn publish_sets_published_date_to_clock_value() {
        let repo = FakePostRepo::with_post(draft(7, 10));
        let (service, _) = service_with(repo.clone(), at(2020, 4, 1));

        let published = service.publish_post(10, 7).await.expect("publish must succeed");

        assert_eq!(published.published_date, Some(at(2020, 4, 1)));
        let updates = repo.updates.lock().expect("updates mutex poisoned").clone();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].published_date, Some(at(2020, 4, 1)));
    }

    #[tokio::test]
    async fn publish_unknown_post_is_not_found_without_write() {
        let repo = FakePostRepo::default();
        let (service, _) = service_with(repo.clone(), at(2020, 4, 1));

        let err = service
            .publish_post(10, 404)
            .await
            .expect_err("missing post must fail");

        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(repo.update_count(), 0);
    }

    #[tokio::test]
    async fn publish_by_non_author_is_forbidden() {
        let repo = FakePostRepo::with_post(draft(7, 99));
        let (service, _) = service_with(repo.clone(), at(2020, 4, 1));

        let err = service.publish_post(10, 7).await.expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert_eq!(repo.update_count(), 0);
    }

    #[tokio::test]
    async fn publish_propagates_persistence_failure() {
        let repo = FakePostRepo::with_post(draft(7, 10));
        *repo.fail_update.lock().expect("fail_update mutex poisoned") = true;
        let (service, _) = service_with(repo, at(2020, 4, 1));

        let err = service.publish_post(10, 7).await.expect_err("must fail");
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[tokio::test]
    async fn list_published_queries_with_clock_now() {
        let repo = FakePostRepo::default();
        let (service, clock) = service_with(repo.clone(), at(2020, 1, 1));

        service.list_published().await.expect("list must succeed");
        assert_eq!(
            *repo.list_now.lock().expect("list_now mutex poisoned"),
            Some(at(2020, 1, 1))
        );

        clock.set(at(3020, 1, 1));
        service.list_published().await.expect("list must succeed");
        assert_eq!(
            *repo.list_now.lock().expect("list_now mutex poisoned"),
            Some(at(3020, 1, 1))
        );
    }

    #[tokio::test]
    async fn update_post_keeps_publication_state() {
        let mut post = draft(7, 10);
        post.publish(at(2020, 3, 1));
        let repo = FakePostRepo::with_post(post);
        let (service, _) = service_with(repo, at(2020, 4, 1));

        let updated = service
            .update_post(
                10,
                7,
                UpdatePostRequest {
                    title: "new".to_string(),
                    text: "body".to_string(),
                },
            )
            .await
            .expect("update must succeed");

        assert_eq!(updated.title, "new");
        assert_eq!(updated.text, "body");
        assert_eq!(updated.published_date, Some(at(2020, 3, 1)));
    }

    #[tokio::test]
    async fn delete_post_returns_forbidden_for_non_owner() {
        let repo = FakePostRepo::with_post(draft(7, 99));
        let (service, _) = service_with(repo, at(2020, 4, 1));

        let err = service.delete_post(10, 7).await.expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    async fn store_with_author() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let author = store
            .create_user(NewUser {
                username: "testuser".to_string(),
                email: None,
                password_hash: "hash".to_string(),
            })
            .await
            .expect("user must be created");
        (store, author.id)
    }

    #[tokio::test]
    async fn listing_follows_clock_across_scenario() {
        let (store, author) = store_with_author().await;
        let (service, clock) = service_with(store.clone(), at(2000, 1, 1));

        let mut ids = Vec::new();
        for (title, published) in [
            ("Test", at(2020, 3, 1)),
            ("past_test", at(2019, 4, 1)),
            ("future_test", at(2120, 4, 1)),
        ] {
            let post = store
                .create_post(NewPost {
                    author_id: author,
                    title: title.to_string(),
                    text: "superText".to_string(),
                    created_date: published,
                    published_date: Some(published),
                })
                .await
                .expect("seed post");
            ids.push(post.id);
        }
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let listed = |posts: Vec<Post>| posts.into_iter().map(|p| p.id).collect::<Vec<_>>();

        clock.set(at(2020, 1, 1));
        assert_eq!(listed(service.list_published().await.expect("list")), vec![b]);

        clock.set(at(2020, 4, 1));
        assert_eq!(listed(service.list_published().await.expect("list")), vec![a, b]);

        clock.set(at(3020, 1, 1));
        assert_eq!(
            listed(service.list_published().await.expect("list")),
            vec![c, a, b]
        );
    }

    #[tokio::test]
    async fn fresh_draft_stays_hidden_until_published() {
        let (store, author) = store_with_author().await;
        let (service, clock) = service_with(store, at(2020, 4, 1));

        let post = service
            .create_post(
                author,
                CreatePostRequest {
                    title: "Test".to_string(),
                    text: "superText".to_string(),
                },
            )
            .await
            .expect("create");

        for year in [1970, 2020, 3020] {
            clock.set(at(year, 1, 1));
            assert!(service.list_published().await.expect("list").is_empty());
        }
        assert!(matches!(
            service.get_visible_post(post.id).await,
            Err(DomainError::NotFound(_))
        ));

        clock.set(at(2020, 4, 1));
        service.publish_post(author, post.id).await.expect("publish");

        let listed = service.list_published().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].published_date, Some(at(2020, 4, 1)));

        let reread = service.get_visible_post(post.id).await.expect("visible");
        assert_eq!(reread.published_date, Some(at(2020, 4, 1)));
    }

    #[tokio::test]
    async fn republish_moves_timestamp_forward() {
        let (store, author) = store_with_author().await;
        let (service, clock) = service_with(store, at(2020, 4, 1));

        let post = service
            .create_post(
                author,
                CreatePostRequest {
                    title: "Test".to_string(),
                    text: "superText".to_string(),
                },
            )
            .await
            .expect("create");

        service.publish_post(author, post.id).await.expect("publish");
        clock.set(at(2020, 4, 1) + Duration::hours(5));
        let again = service.publish_post(author, post.id).await.expect("republish");

        assert_eq!(again.published_date, Some(at(2020, 4, 1) + Duration::hours(5)));
    }

    #[tokio::test]
    async fn scheduled_post_appears_once_clock_passes_it() {
        let (store, author) = store_with_author().await;
        let (service, clock) = service_with(store.clone(), at(2020, 1, 1));

        let post = store
            .create_post(NewPost {
                author_id: author,
                title: "scheduled".to_string(),
                text: "superText".to_string(),
                created_date: at(2020, 1, 1),
                published_date: Some(at(2020, 6, 1)),
            })
            .await
            .expect("seed");

        assert!(service.get_visible_post(post.id).await.is_err());
        clock.set(at(2020, 6, 1));
        assert_eq!(
            service.get_visible_post(post.id).await.expect("visible").id,
            post.id
        );
    }
}

use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;
pub(crate) type SharedUserRepository = Arc<dyn UserRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<SharedUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<SharedPostRepository>>,
}

impl AppState {
    pub(crate) fn new(
        users: SharedUserRepository,
        posts: SharedPostRepository,
        jwt: JwtService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users, jwt)),
            blog_service: Arc::new(BlogService::new(posts, clock)),
        }
    }
}

use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{AuthResponse, Post};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct PostRequestDto<'a> {
    title: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostListDto {
    posts: Vec<Post>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API `blog-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт HTTP-клиент с базовым URL сервера.
    pub(crate) fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error,
            Err(_) => None,
        };
        BlogClientError::from_http_status(status, message)
    }

    async fn execute(request: RequestBuilder) -> BlogClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<T> {
        Self::execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        Self::fetch(
            self.request(Method::POST, "/api/auth/register", None)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn login(&self, username: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        Self::fetch(self.request(Method::POST, "/api/auth/login", None).json(&payload)).await
    }

    pub(crate) async fn delete_account(&self, token: &str) -> BlogClientResult<()> {
        Self::execute(self.request(Method::DELETE, "/api/auth/me", Some(token))).await?;
        Ok(())
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        title: &str,
        text: &str,
    ) -> BlogClientResult<Post> {
        let payload = PostRequestDto { title, text };
        Self::fetch(
            self.request(Method::POST, "/api/posts", Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn get_post(&self, id: i64) -> BlogClientResult<Post> {
        Self::fetch(self.request(Method::GET, &format!("/api/posts/{id}"), None)).await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        title: &str,
        text: &str,
    ) -> BlogClientResult<Post> {
        let payload = PostRequestDto { title, text };
        Self::fetch(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn publish_post(&self, token: &str, id: i64) -> BlogClientResult<Post> {
        Self::fetch(self.request(
            Method::POST,
            &format!("/api/posts/{id}/publish"),
            Some(token),
        ))
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> BlogClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token)))
            .await?;
        Ok(())
    }

    pub(crate) async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        let list: PostListDto = Self::fetch(self.request(Method::GET, "/api/posts", None)).await?;
        Ok(list.posts)
    }

    pub(crate) async fn list_drafts(&self, token: &str) -> BlogClientResult<Vec<Post>> {
        let list: PostListDto =
            Self::fetch(self.request(Method::GET, "/api/posts/drafts", Some(token))).await?;
        Ok(list.posts)
    }
}

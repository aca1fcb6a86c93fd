//! Клиентская библиотека для работы с blog-server по HTTP.
//!
//! `BlogClient` оборачивает REST API сервера (`reqwest`). Клиент хранит
//! JWT-токен после `register`/`login` и автоматически использует его в
//! защищённых операциях.
//!
//! Публичная лента (`list_posts`) содержит только опубликованные посты,
//! самые свежие первыми. Черновики автора доступны через `list_drafts`.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{AuthResponse, Post, User};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса поверх HTTP API.
pub struct BlogClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl BlogClient {
    /// Создаёт клиент для сервера с базовым URL, например
    /// `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let result = self.http_client.register(username, email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, username: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let result = self.http_client.login(username, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Удаляет текущий аккаунт вместе со всеми его постами и забывает токен.
    pub async fn delete_account(&mut self) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_account(token).await?;
        self.token = None;
        Ok(())
    }

    /// Создаёт черновик. Пост не виден в ленте до `publish_post`.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, title: &str, text: &str) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, title, text).await
    }

    /// Возвращает опубликованный пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> BlogClientResult<Post> {
        self.http_client.get_post(id).await
    }

    /// Обновляет заголовок и текст поста.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_post(&self, id: i64, title: &str, text: &str) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.update_post(token, id, title, text).await
    }

    /// Публикует пост: сервер ставит дату публикации равной текущему времени.
    ///
    /// Требует установленный JWT-токен.
    pub async fn publish_post(&self, id: i64) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.publish_post(token, id).await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_post(token, id).await
    }

    /// Возвращает опубликованные посты, самые свежие первыми.
    pub async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        self.http_client.list_posts().await
    }

    /// Возвращает черновики текущего пользователя.
    ///
    /// Требует установленный JWT-токен.
    pub async fn list_drafts(&self) -> BlogClientResult<Vec<Post>> {
        let token = self.require_token()?;
        self.http_client.list_drafts(token).await
    }

    fn require_token(&self) -> BlogClientResult<&str> {
        self.token.as_deref().ok_or(BlogClientError::Unauthorized)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email, если был указан при регистрации.
    pub email: Option<String>,
    /// Дата регистрации (UTC).
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Заголовок (до 200 символов).
    pub title: String,
    /// Текст поста.
    pub text: String,
    /// Дата создания (UTC).
    pub created_date: DateTime<Utc>,
    /// Дата публикации (UTC); `None`, пока пост остаётся черновиком.
    pub published_date: Option<DateTime<Utc>>,
}

impl Post {
    /// Черновик ли это.
    pub fn is_draft(&self) -> bool {
        self.published_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Данные пользователя.
    pub user: User,
}

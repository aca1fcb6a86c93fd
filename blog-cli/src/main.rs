use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use blog_client::{AuthResponse, BlogClient, BlogClientError, Post};
use clap::{Parser, Subcommand};

const TOKEN_FILE: &str = ".blog_token";
const SERVER_ENV: &str = "BLOG_SERVER";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "blog-cli", version, about = "CLI клиент для blog-server")]
struct Cli {
    /// Адрес сервера. По умолчанию берётся из BLOG_SERVER или 127.0.0.1:8080.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Создание черновика (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// Получение опубликованного поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Обновление поста (требует токен).
    ///
    /// Если `--text` не указан, используется текущий текст поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: Option<String>,
    },
    /// Публикация поста текущим временем сервера (требует токен).
    Publish {
        #[arg(long)]
        id: i64,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Лента опубликованных постов, самые свежие первыми.
    List,
    /// Свои черновики (требует токен).
    Drafts,
    /// Удаление аккаунта вместе со всеми постами (требует токен).
    DeleteAccount,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, env::var(SERVER_ENV).ok());
    let mut client = BlogClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .blog_token")? {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, email.as_deref(), &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            print_auth("Регистрация успешна", &auth);
        }
        Command::Login { username, password } => {
            let auth = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            print_auth("Вход выполнен", &auth);
        }
        Command::Create { title, text } => {
            let post = client
                .create_post(&title, &text)
                .await
                .map_err(map_client_error)?;
            print_post("Черновик создан", &post);
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            print_post("Пост", &post);
        }
        Command::Update { id, title, text } => {
            let text = match text {
                Some(text) => text,
                None => current_text(&client, id).await?,
            };

            let post = client
                .update_post(id, &title, &text)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        Command::Publish { id } => {
            let post = client.publish_post(id).await.map_err(map_client_error)?;
            print_post("Пост опубликован", &post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::List => {
            let posts = client.list_posts().await.map_err(map_client_error)?;
            print_list("Опубликовано", &posts);
        }
        Command::Drafts => {
            let posts = client.list_drafts().await.map_err(map_client_error)?;
            print_list("Черновиков", &posts);
        }
        Command::DeleteAccount => {
            client.delete_account().await.map_err(map_client_error)?;
            remove_token().context("не удалось удалить .blog_token")?;
            println!("Аккаунт удалён");
        }
    }

    Ok(())
}

/// Черновик не виден через `get`, поэтому ищем его сначала среди своих черновиков.
async fn current_text(client: &BlogClient, id: i64) -> Result<String> {
    let drafts = client.list_drafts().await.map_err(map_client_error)?;
    if let Some(post) = drafts.into_iter().find(|post| post.id == id) {
        return Ok(post.text);
    }
    let post = client.get_post(id).await.map_err(map_client_error)?;
    Ok(post.text)
}

fn resolve_server(flag: Option<String>, from_env: Option<String>) -> String {
    let raw = flag
        .or(from_env)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &BlogClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    if Path::new(TOKEN_FILE).exists() {
        fs::remove_file(TOKEN_FILE)?;
    }
    Ok(())
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::Unauthorized => {
            "требуется авторизация: выполните `blog-cli login ...` или `blog-cli register ...`"
                .to_string()
        }
        BlogClientError::Forbidden => "операция доступна только автору поста".to_string(),
        BlogClientError::NotFound => "ресурс не найден (или пост ещё не опубликован)".to_string(),
        BlogClientError::Conflict(message) => format!("конфликт: {message}"),
        BlogClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogClientError::Server(message) => format!("ошибка сервера: {message}"),
        BlogClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.access_token);
    println!("user:");
    println!("  id: {}", auth.user.id);
    println!("  username: {}", auth.user.username);
    println!("  email: {}", auth.user.email.as_deref().unwrap_or("-"));
    println!("  date_joined: {}", auth.user.date_joined);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("text: {}", post.text);
    println!("author_id: {}", post.author_id);
    println!("created_date: {}", post.created_date);
    println!("published_date: {}", published_label(post));
}

fn published_label(post: &Post) -> String {
    match post.published_date {
        Some(date) => date.to_string(),
        None => "черновик".to_string(),
    }
}

fn print_list(title: &str, posts: &[Post]) {
    println!("{title}: {}", posts.len());

    for post in posts {
        println!(
            "- [{}] {} ({}, author_id={})",
            post.id,
            post.title,
            published_label(post),
            post.author_id
        );
    }
}

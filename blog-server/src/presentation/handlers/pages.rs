use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

/// What a template needs from a post; dates are preformatted.
pub(crate) struct PostView {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) published: String,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        let published = post
            .published_date
            .map(|date| date.format("%-d %B %Y, %H:%M").to_string())
            .unwrap_or_default();
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            published,
        }
    }
}

#[derive(Template)]
#[template(path = "blog/post_list.html")]
pub(crate) struct PostListTemplate {
    pub(crate) posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "blog/post_detail.html")]
pub(crate) struct PostDetailTemplate {
    pub(crate) post: PostView,
}

#[derive(Template)]
#[template(path = "blog/error.html")]
pub(crate) struct ErrorTemplate {
    pub(crate) status: String,
    pub(crate) message: String,
}

/// [`AppError`] rendered as an HTML page instead of a JSON body.
#[derive(Debug)]
pub(crate) struct PageError(AppError);

impl From<DomainError> for PageError {
    fn from(err: DomainError) -> Self {
        Self(err.into())
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        if status.is_server_error() {
            error!(error = %self.0, "page request failed");
        }

        let page = ErrorTemplate {
            status: status.to_string(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                error!(error = %err, "error page rendering failed");
                (status, Html(status.to_string())).into_response()
            }
        }
    }
}

pub(crate) type PageResult = Result<Html<String>, PageError>;

pub(crate) async fn post_list(State(state): State<AppState>) -> PageResult {
    let posts = state.blog_service.list_published().await?;
    let page = PostListTemplate {
        posts: posts.into_iter().map(PostView::from).collect(),
    };
    Ok(Html(page.render()?))
}

pub(crate) async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> PageResult {
    let post = state.blog_service.get_visible_post(id).await?;
    let page = PostDetailTemplate { post: post.into() };
    Ok(Html(page.render()?))
}

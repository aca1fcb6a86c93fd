use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::pages::{post_detail, post_list};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(post_list))
        .route("/post/{id}", get(post_detail))
}

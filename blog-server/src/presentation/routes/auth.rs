use axum::Router;
use axum::middleware;
use axum::routing::{delete, post};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{delete_me, login, register};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let protected = Router::new()
        .route("/me", delete(delete_me))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}

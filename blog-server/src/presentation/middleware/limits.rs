use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::infrastructure::settings::Settings;

/// Body size cap, per-request timeout and an in-flight cap shared by every route.
pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(settings.http_request_timeout_secs),
        ))
        .layer(GlobalConcurrencyLimitLayer::new(
            settings.http_concurrency_limit,
        ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::apply_limits;
    use crate::infrastructure::settings::Settings;

    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl InFlight {
        async fn hold(&self) -> &'static str {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            "ok"
        }
    }

    fn settings(concurrency: &str) -> Settings {
        Settings::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "JWT_SECRET" => Some("0123456789abcdef0123456789abcdef".to_string()),
            "HTTP_CONCURRENCY_LIMIT" => Some(concurrency.to_string()),
            _ => None,
        })
        .expect("settings must load")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request must build")
    }

    #[tokio::test]
    async fn concurrency_limit_spans_all_routes() {
        let in_flight = Arc::new(InFlight::default());
        let a = in_flight.clone();
        let b = in_flight.clone();
        let router = Router::new()
            .route(
                "/a",
                get(move || {
                    let a = a.clone();
                    async move { a.hold().await }
                }),
            )
            .route(
                "/b",
                get(move || {
                    let b = b.clone();
                    async move { b.hold().await }
                }),
            );
        let router = apply_limits(router, &settings("1"));

        let (first, second) = tokio::join!(
            router.clone().oneshot(get_request("/a")),
            router.clone().oneshot(get_request("/b")),
        );

        assert_eq!(first.expect("infallible").status(), StatusCode::OK);
        assert_eq!(second.expect("infallible").status(), StatusCode::OK);
        assert_eq!(in_flight.peak.load(Ordering::SeqCst), 1);
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

use blog_client::{BlogClient, BlogClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("BLOG_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let mut client = BlogClient::new(base_url).expect("client must build");

    let suffix = unique_suffix();
    let username = format!("http_user_{suffix}");
    let email = format!("http_{suffix}@example.com");
    let password = "password123";

    let register = client
        .register(&username, Some(&email), password)
        .await
        .expect("register must succeed");
    assert!(!register.access_token.is_empty());
    assert_eq!(register.user.username, username);
    assert!(client.get_token().is_some());

    let login = client
        .login(&username, password)
        .await
        .expect("login must succeed");
    assert_eq!(login.user.username, username);

    let created = client
        .create_post("http title", "http content")
        .await
        .expect("create_post must succeed");
    assert_eq!(created.title, "http title");
    assert!(created.is_draft());

    let hidden = client.get_post(created.id).await;
    assert!(matches!(hidden, Err(BlogClientError::NotFound)));

    let drafts = client.list_drafts().await.expect("list_drafts must succeed");
    assert!(drafts.iter().any(|post| post.id == created.id));

    let published = client
        .publish_post(created.id)
        .await
        .expect("publish_post must succeed");
    assert!(!published.is_draft());

    let listed = client.list_posts().await.expect("list_posts must succeed");
    assert!(listed.iter().any(|post| post.id == created.id));

    let fetched = client
        .get_post(created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched.id, created.id);

    let updated = client
        .update_post(created.id, "http title updated", "http content updated")
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.title, "http title updated");
    assert_eq!(updated.published_date, published.published_date);

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");

    let after_delete = client.get_post(created.id).await;
    assert!(matches!(after_delete, Err(BlogClientError::NotFound)));

    client
        .delete_account()
        .await
        .expect("delete_account must succeed");
    assert!(client.get_token().is_none());
}

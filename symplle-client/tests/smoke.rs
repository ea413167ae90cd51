use std::time::{SystemTime, UNIX_EPOCH};

use symplle_client::{SymplleClient, SymplleClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("SYMPLLE_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let mut client = SymplleClient::new(base_url).expect("client must build");

    let suffix = unique_suffix();
    let username = format!("user_{suffix}");
    let email = format!("user_{suffix}@example.com");
    let password = "password123";

    let register = client
        .register(&username, &email, password)
        .await
        .expect("register must succeed");
    assert!(!register.access_token.is_empty());
    assert_eq!(register.user.username, username);
    assert!(client.token().is_some());

    let login = client
        .login(&username, password)
        .await
        .expect("login must succeed");
    assert_eq!(login.user.username, username);

    let created = client
        .create_post("smoke content", None)
        .await
        .expect("create_post must succeed");
    assert_eq!(created.content, "smoke content");
    assert_eq!(created.privacy, "public");

    let fetched = client
        .get_post(created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched.id, created.id);

    let listed = client
        .list_posts(20, 0)
        .await
        .expect("list_posts must succeed");
    assert!(listed.posts.iter().any(|post| post.id == created.id));

    let liked = client
        .toggle_like(created.id)
        .await
        .expect("toggle_like must succeed");
    assert!(liked.is_liked());
    assert_eq!(liked.likes_count, 1);

    let timeline = client
        .timeline(None, 20, 0)
        .await
        .expect("timeline must succeed");
    assert_eq!(timeline.algorithm, "smart");

    client
        .trending(10)
        .await
        .expect("trending must succeed");

    client.set_locale(Some("pt_BR"));
    let info = client.i18n_info().await.expect("i18n info must succeed");
    assert_eq!(info.current_locale, "pt_BR");

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");

    let after_delete = client.get_post(created.id).await;
    assert!(matches!(after_delete, Err(SymplleClientError::NotFound(_))));
}

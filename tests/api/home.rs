use crate::helpers::spawn_app;

#[tokio::test]
async fn landing_page_is_served_at_the_root() {
    let app = spawn_app().await;

    let response = app.get("/").await;

    assert_eq!(200, response.status().as_u16());
    let content_type = response.headers()["Content-Type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"<form id="subscribe-form""#));
    assert!(page.contains("statusTimer = setTimeout(() => { status.textContent = ''; }, 2500)"));
}

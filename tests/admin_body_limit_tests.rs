mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::*;

#[tokio::test]
async fn admin_routes_return_413_for_oversized_body() {
    let db = TempDb::new("body-limit");
    let (app, store) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    let oversized_label = "a".repeat(17 * 1024 * 1024);
    let oversized_payload = format!(r#"[{{"label":"{oversized_label}","url":"https://x.example"}}]"#);

    let resp = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri("/admin/buttons")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &cookie)
            .body(Body::from(oversized_payload))
            .expect("failed to build request"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.list_buttons().await.expect("list").is_empty());
}

#[tokio::test]
async fn admin_routes_accept_inline_images_over_default_limit() {
    let db = TempDb::new("body-ok");
    let (app, _) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    // larger than axum's 2 MiB default, well under the admin limit
    let image = format!("data:image/png;base64,{}", "A".repeat(4 * 1024 * 1024));
    let payload = serde_json::json!({ "name": "Ada", "profile_image_url": image });

    let resp = send(&app, json_request("PUT", "/admin/profile", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

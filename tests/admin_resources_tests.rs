mod common;

use axum::http::StatusCode;
use biolink::db::ProfileStore;
use biolink::types::payload::{ButtonInput, LinkInput, ProfileInput};
use biolink::BiolinkError;
use common::*;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

fn button(label: &str, url: &str) -> ButtonInput {
    ButtonInput {
        label: label.into(),
        url: url.into(),
    }
}

#[tokio::test]
async fn replacing_buttons_renumbers_from_zero() {
    let db = TempDb::new("buttons-order");
    let (app, _) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    let payload = json!([
        { "label": "Shop", "url": "https://shop.example", "order_index": 9 },
        { "label": "Blog", "url": "https://blog.example" },
        { "label": "Contact", "url": "mailto:me@example.com" }
    ]);
    let resp = send(&app, json_request("PUT", "/admin/buttons", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved = body_json(resp).await;
    let order: Vec<i64> = saved
        .as_array()
        .expect("array")
        .iter()
        .map(|b| b["order_index"].as_i64().expect("order_index"))
        .collect();
    assert_eq!(order, vec![0, 1, 2]);

    // a second save replaces, never appends
    let payload = json!([{ "label": "Only", "url": "https://only.example" }]);
    let resp = send(&app, json_request("PUT", "/admin/buttons", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, get("/admin/buttons", Some(&cookie))).await;
    let listed = body_json(resp).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["label"], "Only");
    assert_eq!(listed[0]["order_index"], 0);
}

#[tokio::test]
async fn invalid_entry_leaves_existing_links_untouched() {
    let db = TempDb::new("links-atomic");
    let (app, store) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    let payload = json!([
        { "title": "GitHub", "url": "https://github.com/ada" },
        { "title": "Blog", "url": "https://blog.example" }
    ]);
    let resp = send(&app, json_request("PUT", "/admin/links", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let payload = json!([
        { "title": "New", "url": "https://new.example" },
        { "title": "", "url": "https://broken.example" }
    ]);
    let resp = send(&app, json_request("PUT", "/admin/links", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION");
    assert!(body["error"].as_str().unwrap_or_default().contains("link 2"));

    let links = store.list_links().await.expect("list links");
    let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["GitHub", "Blog"]);
}

#[tokio::test]
async fn script_urls_are_refused() {
    let db = TempDb::new("links-scheme");
    let (app, store) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    let payload = json!([{ "title": "Prize", "url": "javascript:alert(document.cookie)" }]);
    let resp = send(&app, json_request("PUT", "/admin/links", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_json(resp).await["error"]
            .as_str()
            .unwrap_or_default()
            .contains("link 1")
    );

    let payload = json!([{ "label": "Call", "url": "tel:+15551234" }]);
    let resp = send(&app, json_request("PUT", "/admin/buttons", Some(&cookie), &payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.list_links().await.expect("list").is_empty());
}

#[tokio::test]
async fn non_array_payload_is_a_validation_error() {
    let db = TempDb::new("buttons-shape");
    let (app, _) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    let resp = send(
        &app,
        json_request("PUT", "/admin/buttons", Some(&cookie), &json!({ "label": "x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"],
        "Invalid data format: expected an array of buttons."
    );
}

#[tokio::test]
async fn profile_is_created_then_updated_in_place() {
    let db = TempDb::new("profile");
    let (app, _) = app_with(&test_config(&db)).await;
    let cookie = login(&app).await;

    let resp = send(&app, get("/admin/profile", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await.is_null());

    let resp = send(
        &app,
        json_request(
            "PUT",
            "/admin/profile",
            Some(&cookie),
            &json!({ "name": "Ada", "bio": "Engines", "background_type": "gradient",
                     "background_color": "#123456", "background_overlay_opacity": 0 }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["background_type"], "gradient");
    assert_eq!(created["background_overlay_opacity"], 0.0);

    let resp = send(
        &app,
        json_request("PUT", "/admin/profile", Some(&cookie), &json!({ "name": "Ada L." })),
    )
    .await;
    let updated = body_json(resp).await;
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Ada L.");
    assert_eq!(updated["background_color"], "#000000");
    assert_eq!(updated["created_at"], created["created_at"]);

    let resp = send(
        &app,
        json_request(
            "PUT",
            "/admin/profile",
            Some(&cookie),
            &json!({ "name": "Ada", "bio": "Analytical engines", "background_color": "#111111" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved = body_json(resp).await;

    let resp = send(&app, get("/admin/profile", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["name"], "Ada");
    assert_eq!(fetched["bio"], "Analytical engines");
    assert_eq!(fetched["background_color"], "#111111");
    assert_eq!(fetched, saved);

    let resp = send(
        &app,
        json_request("PUT", "/admin/profile", Some(&cookie), &json!({ "name": "  " })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Name is required.");
}

#[tokio::test]
async fn legacy_schema_saves_base_profile_fields() {
    let db = TempDb::new("legacy");
    let opts = SqliteConnectOptions::from_str(&db.url())
        .expect("sqlite url")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(opts)
        .await
        .expect("open pool");
    sqlx::query(
        r#"CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            bio TEXT NULL,
            profile_image_url TEXT NULL,
            background_color TEXT NOT NULL DEFAULT '#000000',
            background_type TEXT NOT NULL DEFAULT 'solid',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
    )
    .execute(&pool)
    .await
    .expect("create legacy table");

    let store = ProfileStore::new(pool, 1);
    store.init_schema().await.expect("init schema");

    let user = store
        .save_profile(&ProfileInput {
            name: "Ada".into(),
            background_image_url: Some("https://img.example/bg.png".into()),
            background_overlay_opacity: Some(0.2),
            ..Default::default()
        })
        .await
        .expect("fallback save");
    assert_eq!(user.name, "Ada");
    assert_eq!(user.background_image_url, None);
    assert_eq!(user.background_overlay_opacity, 0.5);

    let fetched = store.fetch_user().await.expect("fetch").expect("profile row");
    assert_eq!(fetched.id, store.owner_id());
}

#[tokio::test]
async fn store_rejects_incomplete_buttons_before_writing() {
    let db = TempDb::new("store-buttons");
    let store = ProfileStore::connect(&db.url(), 1).await.expect("store");

    store
        .replace_buttons(&[button("A", "https://a.example")])
        .await
        .expect("first save");
    let err = store
        .replace_buttons(&[button("B", "https://b.example"), button("C", " ")])
        .await
        .expect_err("blank url");
    assert!(matches!(err, BiolinkError::Validation(_)));

    let kept = store.list_buttons().await.expect("list");
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].label, "A");

    let links = store
        .replace_links(&[LinkInput {
            title: "X".into(),
            url: "https://x.com/ada".into(),
            icon_url: Some("  ".into()),
        }])
        .await
        .expect("links");
    assert_eq!(links[0].icon_url, None);
}

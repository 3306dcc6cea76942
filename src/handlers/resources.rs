//! Fetch / replace-all handlers for the profile, buttons and links.
//! Every successful save drops the cached public page.

use axum::{Json, extract::State};
use tracing::info;

use crate::db::{Button, Link, PageSnapshot, User};
use crate::middleware::payload::JsonList;
use crate::types::payload::{ButtonInput, LinkInput, ProfileInput};
use crate::{BiolinkError, router::BiolinkState};

/// GET /admin/data
pub async fn get_admin_data(
    State(state): State<BiolinkState>,
) -> Result<Json<PageSnapshot>, BiolinkError> {
    Ok(Json(state.store.snapshot().await?))
}

/// GET /admin/profile -> `null` until the first save.
pub async fn get_profile(
    State(state): State<BiolinkState>,
) -> Result<Json<Option<User>>, BiolinkError> {
    Ok(Json(state.store.fetch_user().await?))
}

/// PUT /admin/profile
pub async fn put_profile(
    State(state): State<BiolinkState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<User>, BiolinkError> {
    let user = state.store.save_profile(&input).await?;
    state.page_cache.invalidate().await;
    info!(user_id = user.id, "profile saved");
    Ok(Json(user))
}

/// GET /admin/buttons
pub async fn get_buttons(
    State(state): State<BiolinkState>,
) -> Result<Json<Vec<Button>>, BiolinkError> {
    Ok(Json(state.store.list_buttons().await?))
}

/// PUT /admin/buttons
pub async fn put_buttons(
    State(state): State<BiolinkState>,
    JsonList(buttons): JsonList<ButtonInput>,
) -> Result<Json<Vec<Button>>, BiolinkError> {
    let saved = state.store.replace_buttons(&buttons).await?;
    state.page_cache.invalidate().await;
    Ok(Json(saved))
}

/// GET /admin/links
pub async fn get_links(
    State(state): State<BiolinkState>,
) -> Result<Json<Vec<Link>>, BiolinkError> {
    Ok(Json(state.store.list_links().await?))
}

/// PUT /admin/links
pub async fn put_links(
    State(state): State<BiolinkState>,
    JsonList(links): JsonList<LinkInput>,
) -> Result<Json<Vec<Link>>, BiolinkError> {
    let saved = state.store.replace_links(&links).await?;
    state.page_cache.invalidate().await;
    Ok(Json(saved))
}

use axum::{Json, extract::State, response::Html};
use axum_extra::TypedHeader;
use headers::CacheControl;
use tracing::error;

use crate::render::page::{render_page, render_placeholder};
use crate::service::page_cache::PublicPage;
use crate::{BiolinkError, router::BiolinkState};

fn cache_control(state: &BiolinkState) -> TypedHeader<CacheControl> {
    TypedHeader(
        CacheControl::new()
            .with_public()
            .with_max_age(state.page_cache.window()),
    )
}

/// GET / -> the public page. Store failures are logged and render the
/// placeholder rather than an error page.
pub async fn home_page(State(state): State<BiolinkState>) -> (TypedHeader<CacheControl>, Html<String>) {
    let html = match state.page_cache.get(&state.store, &state.client).await {
        Ok(page) => render_page(&page),
        Err(e) => {
            error!(error = %e, "failed to load public page data");
            render_placeholder()
        }
    };
    (cache_control(&state), Html(html))
}

/// GET /api/page -> the same snapshot as JSON.
pub async fn page_json(
    State(state): State<BiolinkState>,
) -> Result<(TypedHeader<CacheControl>, Json<PublicPage>), BiolinkError> {
    let page = state.page_cache.get(&state.store, &state.client).await?;
    Ok((cache_control(&state), Json(PublicPage::clone(&page))))
}

use crate::db::{PageSnapshot, ProfileStore};
use crate::error::BiolinkError;
use crate::imaging::{DEFAULT_COLOR, estimate_dominant_color};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// What the public page renders: the stored data plus the glow tint sampled
/// from the profile image.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPage {
    #[serde(flatten)]
    pub snapshot: PageSnapshot,
    pub glow_color: String,
}

struct CachedPage {
    loaded_at: Instant,
    page: Arc<PublicPage>,
}

/// Last sampled glow, keyed by the profile image it came from.
struct CachedGlow {
    image: String,
    color: String,
}

/// Public page snapshot shared between requests for at most `window`.
/// Admin saves call [`PageCache::invalidate`] so edits show up immediately.
///
/// Locks are only held to read or swap the cached values; the database read
/// and the glow sampling run unlocked. A reload that started before an
/// invalidation is served to its caller but not stored.
pub struct PageCache {
    window: Duration,
    slot: RwLock<Option<CachedPage>>,
    glow: RwLock<Option<CachedGlow>>,
    generation: AtomicU64,
}

impl PageCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: RwLock::new(None),
            glow: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub async fn get(
        &self,
        store: &ProfileStore,
        client: &reqwest::Client,
    ) -> Result<Arc<PublicPage>, BiolinkError> {
        if let Some(page) = self.fresh().await {
            return Ok(page);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let snapshot = store.snapshot().await?;
        let image = snapshot
            .user
            .as_ref()
            .and_then(|u| u.profile_image_url.clone());
        let glow_color = match image {
            Some(image) => self.glow_for(image, client).await,
            None => DEFAULT_COLOR.to_string(),
        };
        let page = Arc::new(PublicPage {
            snapshot,
            glow_color,
        });

        let mut slot = self.slot.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            debug!(window_secs = self.window.as_secs(), "public page reloaded");
            *slot = Some(CachedPage {
                loaded_at: Instant::now(),
                page: page.clone(),
            });
        }
        Ok(page)
    }

    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.slot.write().await = None;
    }

    /// True when a page is stored and still inside the window.
    pub async fn is_fresh(&self) -> bool {
        self.fresh().await.is_some()
    }

    async fn fresh(&self) -> Option<Arc<PublicPage>> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.loaded_at.elapsed() < self.window)
            .map(|cached| cached.page.clone())
    }

    async fn glow_for(&self, image: String, client: &reqwest::Client) -> String {
        if let Some(cached) = self.glow.read().await.as_ref()
            && cached.image == image
        {
            return cached.color.clone();
        }
        let color = estimate_dominant_color(client, &image).await;
        // the fallback is not remembered so an unreachable image is retried
        if color != DEFAULT_COLOR {
            *self.glow.write().await = Some(CachedGlow {
                image,
                color: color.clone(),
            });
        }
        color
    }
}

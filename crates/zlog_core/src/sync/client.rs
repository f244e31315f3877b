//! Random-dream fetch and share-with-reconcile.

use crate::config::AppConfig;
use crate::model::dream::Dream;
use crate::store::sleep_store::SleepStore;
use crate::sync::api::{DreamsApi, HttpDreamsApi};
use crate::sync::{ShareBlock, SyncError, SyncResult};
use log::{info, warn};
use rand::seq::SliceRandom;
use std::time::Instant;

/// Where a displayed dream came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DreamSource {
    /// The user's own journal.
    Local,
    /// Fetched from the dreams service.
    Remote,
}

/// Returns why `dream` may not be shared, if anything blocks it.
pub fn share_block(dream: &Dream, source: DreamSource) -> Option<ShareBlock> {
    if source == DreamSource::Remote {
        Some(ShareBlock::RemoteSource)
    } else if dream.is_uploaded {
        Some(ShareBlock::AlreadyUploaded)
    } else {
        None
    }
}

/// `false` for remote dreams and for dreams already uploaded.
pub fn can_share(dream: &Dream, source: DreamSource) -> bool {
    share_block(dream, source).is_none()
}

/// Client for the shared dreams service.
pub struct RemoteSyncClient<A: DreamsApi = HttpDreamsApi> {
    api: A,
}

impl RemoteSyncClient<HttpDreamsApi> {
    pub fn from_config(config: &AppConfig) -> SyncResult<Self> {
        Ok(Self::new(HttpDreamsApi::from_config(config)?))
    }
}

impl<A: DreamsApi> RemoteSyncClient<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn can_share(&self, dream: &Dream, source: DreamSource) -> bool {
        can_share(dream, source)
    }

    /// Lists every dream the service holds.
    pub async fn fetch_dreams(&self) -> SyncResult<Vec<Dream>> {
        let started_at = Instant::now();
        info!("event=dreams_fetch module=sync status=start");
        match self.api.list_dreams().await {
            Ok(dreams) => {
                info!(
                    "event=dreams_fetch module=sync status=ok count={} duration_ms={}",
                    dreams.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(dreams)
            }
            Err(err) => {
                warn!(
                    "event=dreams_fetch module=sync status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Picks one remote dream uniformly at random; `Ok(None)` when the
    /// service has none.
    pub async fn fetch_random_dream(&self) -> SyncResult<Option<Dream>> {
        let dreams = self.fetch_dreams().await?;
        Ok(dreams.choose(&mut rand::thread_rng()).cloned())
    }

    /// Uploads `dream` unless [`can_share`] refuses it.
    ///
    /// Local state is untouched; see [`Self::share_and_reconcile`].
    pub async fn share_dream(&self, dream: &Dream, source: DreamSource) -> SyncResult<()> {
        if let Some(reason) = share_block(dream, source) {
            info!(
                "event=dream_share module=sync status=skipped dream_id={} reason={:?}",
                dream.id, reason
            );
            return Err(SyncError::NotShareable(reason));
        }

        let started_at = Instant::now();
        info!("event=dream_share module=sync status=start dream_id={}", dream.id);
        match self.api.post_dream(dream).await {
            Ok(()) => {
                info!(
                    "event=dream_share module=sync status=ok dream_id={} duration_ms={}",
                    dream.id,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=dream_share module=sync status=error dream_id={} duration_ms={} error={}",
                    dream.id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Shares `dream`, then marks every copy of it in `store` as uploaded.
    ///
    /// Returns the number of copies updated. On failure `store` is unchanged.
    pub async fn share_and_reconcile(
        &self,
        dream: &Dream,
        source: DreamSource,
        store: &mut SleepStore,
    ) -> SyncResult<usize> {
        self.share_dream(dream, source).await?;
        let updated = store.mark_uploaded(dream.id);
        info!(
            "event=dream_reconcile module=sync status=ok dream_id={} updated={}",
            dream.id, updated
        );
        Ok(updated)
    }
}

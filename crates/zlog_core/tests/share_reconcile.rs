use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use zlog_core::sync::{ShareBlock, SyncResult};
use zlog_core::{
    Dream, DreamSource, DreamType, DreamsApi, MemoryDocumentStore, RemoteSyncClient, Sleep,
    SleepStore, SyncError,
};

/// In-process dreams service.
#[derive(Default)]
struct FakeDreamsApi {
    listed: Vec<Dream>,
    posted: Mutex<Vec<Dream>>,
    fail_with: Option<SyncError>,
}

impl FakeDreamsApi {
    fn failing(err: SyncError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    fn posted(&self) -> Vec<Dream> {
        self.posted.lock().expect("lock posted").clone()
    }
}

#[async_trait]
impl DreamsApi for FakeDreamsApi {
    async fn list_dreams(&self) -> SyncResult<Vec<Dream>> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(self.listed.clone()),
        }
    }

    async fn post_dream(&self, dream: &Dream) -> SyncResult<()> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.posted.lock().expect("lock posted").push(dream.clone());
        Ok(())
    }
}

fn journal_sharing(dream: &Dream) -> SleepStore {
    let mut store = SleepStore::new(Arc::new(MemoryDocumentStore::new()))
        .expect("store inside runtime");
    let other = Dream::new("Library", "endless shelves", DreamType::Lucid);
    store.append(Sleep::new(chrono_tz::UTC).with_dreams(vec![dream.clone(), other]));
    store.append(Sleep::new(chrono_tz::UTC).with_dreams(vec![dream.clone()]));
    store
}

#[tokio::test]
async fn sharing_marks_every_copy_of_the_dream() {
    let dream = Dream::new("Caravan", "driving at night", DreamType::Normal);
    let mut store = journal_sharing(&dream);
    let client = RemoteSyncClient::new(FakeDreamsApi::default());

    let updated = client
        .share_and_reconcile(&dream, DreamSource::Local, &mut store)
        .await
        .expect("share succeeds");

    assert_eq!(updated, 2);
    assert_eq!(client.api().posted(), vec![dream.clone()]);
    let flags: Vec<(bool, bool)> = store
        .all_dreams()
        .map(|d| (d.id == dream.id, d.is_uploaded))
        .collect();
    assert_eq!(flags, vec![(true, true), (false, false), (true, true)]);
}

#[tokio::test]
async fn failed_share_leaves_the_journal_untouched() {
    let dream = Dream::new("Caravan", "driving at night", DreamType::Normal);
    let mut store = journal_sharing(&dream);
    let before = store.sleeps().to_vec();
    let mut updates = store.subscribe();
    let client = RemoteSyncClient::new(FakeDreamsApi::failing(SyncError::Status {
        status: 500,
        endpoint: "http://localhost:8080/api/dreams".to_string(),
    }));

    let err = client
        .share_and_reconcile(&dream, DreamSource::Local, &mut store)
        .await
        .expect_err("server error");

    assert!(matches!(err, SyncError::Status { status: 500, .. }));
    assert_eq!(store.sleeps(), before.as_slice());
    assert!(!updates.has_changed().expect("store alive"));
}

#[tokio::test]
async fn uploaded_and_remote_dreams_are_refused_before_any_request() {
    let client = RemoteSyncClient::new(FakeDreamsApi::default());
    let mut uploaded = Dream::new("Stairs", "falling", DreamType::Nightmare);
    uploaded.is_uploaded = true;
    let fresh = Dream::new("Sky", "flying", DreamType::Lucid);

    assert!(!client.can_share(&uploaded, DreamSource::Local));
    assert!(!client.can_share(&fresh, DreamSource::Remote));
    assert!(client.can_share(&fresh, DreamSource::Local));

    let err = client
        .share_dream(&uploaded, DreamSource::Local)
        .await
        .expect_err("already uploaded");
    assert_eq!(err, SyncError::NotShareable(ShareBlock::AlreadyUploaded));
    let err = client
        .share_dream(&fresh, DreamSource::Remote)
        .await
        .expect_err("remote dream");
    assert_eq!(err, SyncError::NotShareable(ShareBlock::RemoteSource));
    assert!(client.api().posted().is_empty());
}

#[tokio::test]
async fn random_remote_dream_comes_from_the_listing() {
    let listed = vec![
        Dream::new("One", "a", DreamType::Normal),
        Dream::new("Two", "b", DreamType::Fragment),
    ];
    let client = RemoteSyncClient::new(FakeDreamsApi {
        listed: listed.clone(),
        ..FakeDreamsApi::default()
    });
    let picked = client
        .fetch_random_dream()
        .await
        .expect("fetch succeeds")
        .expect("non-empty listing");
    assert!(listed.contains(&picked));

    let empty = RemoteSyncClient::new(FakeDreamsApi::default());
    assert_eq!(empty.fetch_random_dream().await.expect("fetch succeeds"), None);

    let offline = RemoteSyncClient::new(FakeDreamsApi::failing(SyncError::Timeout));
    assert_eq!(offline.fetch_random_dream().await, Err(SyncError::Timeout));
}

#[tokio::test]
async fn local_random_dream_covers_every_sleep() {
    let dream = Dream::new("Caravan", "driving at night", DreamType::Normal);
    let store = journal_sharing(&dream);
    let picked = store.random_dream().expect("journal has dreams");
    assert!(store.all_dreams().any(|d| d == &picked));

    let empty = SleepStore::new(Arc::new(MemoryDocumentStore::new())).expect("store");
    assert!(empty.random_dream().is_none());
}

//! Behavioural tests for the cache-aside orchestrator over the in-memory
//! store and a hand-written cache that can be switched into an outage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rstest::{fixture, rstest};
use user_directory::domain::ports::{
    FixtureUserRepository, UpdateUserRequest, UserCache, UserCacheError, UserDirectory,
};
use user_directory::domain::{ErrorCode, User, UserDirectoryService, UserId};

/// In-memory cache recording traffic, with a switchable outage.
#[derive(Default)]
struct MemoryCache {
    entries: Mutex<HashMap<UserId, User>>,
    down: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryCache {
    fn fail_all(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), UserCacheError> {
        if self.down.load(Ordering::SeqCst) {
            Err(UserCacheError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }

    fn entry(&self, id: UserId) -> Option<User> {
        self.entries.lock().expect("cache lock").get(&id).cloned()
    }
}

#[async_trait]
impl UserCache for MemoryCache {
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.entry(id))
    }

    async fn set(&self, user: &User, _ttl: Option<Duration>) -> Result<(), UserCacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries
            .lock()
            .expect("cache lock")
            .insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserCacheError> {
        self.check()?;
        self.entries.lock().expect("cache lock").remove(&id);
        Ok(())
    }
}

struct Harness {
    service: UserDirectoryService<FixtureUserRepository, MemoryCache>,
    cache: Arc<MemoryCache>,
}

#[fixture]
fn harness() -> Harness {
    let cache = Arc::new(MemoryCache::default());
    let service = UserDirectoryService::new(
        Arc::new(FixtureUserRepository::new()),
        Some(Arc::clone(&cache)),
    )
    .with_cache_ttl(Duration::from_secs(60));
    Harness { service, cache }
}

#[rstest]
#[tokio::test]
async fn lifecycle_keeps_cache_consistent_with_store(harness: Harness) {
    let Harness { service, cache } = harness;

    let created = service
        .create_user("ada@example.com", "Ada")
        .await
        .expect("create succeeds");
    assert!(created.id.get() > 0);
    assert!(cache.entry(created.id).is_none(), "create leaves cache cold");

    let first = service.get_user(created.id.get()).await.expect("get succeeds");
    assert_eq!(first.as_ref(), Some(&created));
    assert_eq!(cache.entry(created.id).as_ref(), Some(&created));

    let updated = service
        .update_user(UpdateUserRequest {
            id: created.id.get(),
            email: String::new(),
            name: "Ada Lovelace".to_owned(),
        })
        .await
        .expect("update succeeds");
    assert_eq!(updated.email, "ada@example.com");
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(cache.entry(created.id).as_ref(), Some(&updated));

    let reread = service.get_user(created.id.get()).await.expect("get succeeds");
    assert_eq!(reread, Some(updated));

    service
        .delete_user(created.id.get())
        .await
        .expect("delete succeeds");
    assert!(cache.entry(created.id).is_none());
    assert_eq!(
        service.get_user(created.id.get()).await.expect("get succeeds"),
        None
    );
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected(harness: Harness) {
    let service = harness.service;
    service
        .create_user("ada@example.com", "Ada")
        .await
        .expect("first create succeeds");

    let err = service
        .create_user("ada@example.com", "Someone Else")
        .await
        .expect_err("duplicate email");

    assert_eq!(err.code(), ErrorCode::AlreadyExists);
}

#[rstest]
#[tokio::test]
async fn second_get_is_served_from_cache(harness: Harness) {
    let Harness { service, cache } = harness;
    let created = service
        .create_user("grace@example.com", "Grace")
        .await
        .expect("create succeeds");

    service.get_user(created.id.get()).await.expect("first get");
    service.get_user(created.id.get()).await.expect("second get");

    assert_eq!(cache.reads.load(Ordering::SeqCst), 2);
    assert_eq!(cache.writes.load(Ordering::SeqCst), 1, "only the miss populates");
}

#[rstest]
#[tokio::test]
async fn cache_outage_degrades_reads_but_surfaces_mutation_failures(harness: Harness) {
    let Harness { service, cache } = harness;
    cache.fail_all();

    let created = service
        .create_user("ada@example.com", "Ada")
        .await
        .expect("create ignores the cache");
    let fetched = service
        .get_user(created.id.get())
        .await
        .expect("reads fall through to the store");
    assert_eq!(fetched, Some(created.clone()));

    let err = service
        .update_user(UpdateUserRequest {
            id: created.id.get(),
            email: "lovelace@example.com".to_owned(),
            name: String::new(),
        })
        .await
        .expect_err("cache overwrite failure surfaces");
    assert_eq!(err.code(), ErrorCode::InternalError);

    let stored = service
        .get_user(created.id.get())
        .await
        .expect("store still answers")
        .expect("user exists");
    assert_eq!(stored.email, "lovelace@example.com", "store mutation committed");
}

#[rstest]
#[case(0)]
#[case(-5)]
#[tokio::test]
async fn non_positive_ids_never_reach_backends(harness: Harness, #[case] id: i64) {
    let Harness { service, cache } = harness;

    let err = service.get_user(id).await.expect_err("invalid id");

    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(cache.reads.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn directory_without_cache_serves_from_store() {
    let service = UserDirectoryService::<FixtureUserRepository, MemoryCache>::new(
        Arc::new(FixtureUserRepository::new()),
        None,
    );
    assert!(!service.has_cache());

    let created = service
        .create_user("ada@example.com", "Ada")
        .await
        .expect("create succeeds");
    let err = service
        .delete_user(created.id.get() + 1)
        .await
        .expect_err("unknown id");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        service.get_user(created.id.get()).await.expect("get succeeds"),
        Some(created)
    );
}

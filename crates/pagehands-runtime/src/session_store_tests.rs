use super::*;
use pagehands_protocols::types::Message;

async fn age(store: &SessionStore, tab_id: &str, hours: i64) {
    let handle = store.get_or_create(tab_id);
    let mut session = handle.lock().await;
    session.last_activity = Utc::now() - chrono::Duration::hours(hours);
}

#[tokio::test]
async fn test_get_or_create_returns_same_session() {
    let store = SessionStore::new();
    let first = store.get_or_create("tab-1");
    first.lock().await.push(Message::user("hello"));

    let second = store.get_or_create("tab-1");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.lock().await.history.len(), 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_does_not_create() {
    let store = SessionStore::new();
    assert!(store.get("tab-1").is_none());
    assert!(store.is_empty());
}

#[test]
fn test_remove() {
    let store = SessionStore::new();
    store.get_or_create("tab-1");
    assert!(store.remove("tab-1"));
    assert!(!store.remove("tab-1"));
    assert!(!store.contains("tab-1"));
}

#[tokio::test]
async fn test_sweep_removes_only_idle_sessions() {
    let store = SessionStore::new();
    age(&store, "old", 2).await;
    store.get_or_create("fresh");

    let removed = store.sweep_stale(Duration::from_secs(3600));
    assert_eq!(removed, 1);
    assert!(!store.contains("old"));
    assert!(store.contains("fresh"));
}

#[tokio::test]
async fn test_sweep_skips_locked_session() {
    let store = SessionStore::new();
    age(&store, "busy", 2).await;

    let handle = store.get_or_create("busy");
    let _guard = handle.lock().await;
    assert_eq!(store.sweep_stale(Duration::from_secs(3600)), 0);
    assert!(store.contains("busy"));
}

#[tokio::test]
async fn test_sweep_does_not_remove_replacement() {
    let store = SessionStore::new();
    age(&store, "tab", 2).await;
    let stale = store.get_or_create("tab");

    store.remove("tab");
    store.get_or_create("tab");
    assert_eq!(store.sweep_stale(Duration::from_secs(3600)), 0);
    assert!(!Arc::ptr_eq(&stale, &store.get_or_create("tab")));
}

#[tokio::test]
async fn test_cleaner_sweep() {
    let store = Arc::new(SessionStore::new());
    age(&store, "a", 3).await;
    age(&store, "b", 3).await;

    let cleaner = SessionCleaner::new(store.clone(), Duration::from_secs(3600), Duration::from_secs(300));
    assert_eq!(cleaner.sweep(), 2);
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cleaner_task_runs_on_interval() {
    let store = Arc::new(SessionStore::new());
    age(&store, "old", 2).await;

    let handle = SessionCleaner::new(store.clone(), Duration::from_secs(3600), Duration::from_secs(300)).spawn();

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(store.contains("old"));

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(!store.contains("old"));

    handle.abort();
}

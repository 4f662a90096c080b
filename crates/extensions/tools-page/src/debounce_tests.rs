use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;

fn counter() -> (Arc<AtomicUsize>, TrailingDebounce) {
    let fired = Arc::new(AtomicUsize::new(0));
    let count = fired.clone();
    let debounce = TrailingDebounce::spawn(Duration::from_millis(500), move || {
        let count = count.clone();
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });
    (fired, debounce)
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_burst_fires_once_after_quiet_period() {
    let (fired, debounce) = counter();

    for _ in 0..5 {
        debounce.trigger();
        advance(100).await;
    }
    // Last trigger at t=400ms; quiet period ends at 900ms.
    advance(399).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    advance(2).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    advance(5_000).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_fire_separately() {
    let (fired, debounce) = counter();

    debounce.trigger();
    advance(600).await;
    debounce.trigger();
    debounce.trigger();
    advance(600).await;

    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_trigger_never_fires() {
    let (fired, _debounce) = counter();
    advance(10_000).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_flushes_pending_trigger() {
    let (fired, debounce) = counter();
    debounce.trigger();
    debounce.close().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let (fired, debounce) = counter();
    debounce.close().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_notifier_emits_page_changed() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = DomChangeNotifier::from_settings("tab-9", &ExecutorConfig::default(), tx);
    assert_eq!(notifier.tab_id(), "tab-9");

    for _ in 0..20 {
        notifier.record_mutation();
        advance(10).await;
    }
    advance(600).await;

    let event = rx.try_recv().unwrap();
    assert_eq!(
        event,
        PageEvent::PageChanged {
            tab_id: "tab-9".to_string()
        }
    );
    assert!(rx.try_recv().is_err());
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        serde_json::json!({"action": "page_changed", "tabId": "tab-9"})
    );

    notifier.close().await;
}

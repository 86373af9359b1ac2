use super::*;
use console_protocols::error::EventError;
use console_protocols::event::event_fn;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_handler(counter: Arc<AtomicUsize>) -> Arc<dyn EventHandler> {
    event_fn(move |_event_type, _payload| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

fn failing_handler() -> Arc<dyn EventHandler> {
    event_fn(|_event_type, _payload| async {
        Err(EventError::HandlerFailed("boom".to_string()))
    })
}

#[tokio::test]
async fn test_publish_without_subscribers() {
    let bus = EventBus::new();
    let report = bus.publish("nothing.here", json!({})).await;
    assert_eq!(report, PublishReport::default());
}

#[tokio::test]
async fn test_failing_handler_does_not_block_others() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));

    bus.subscribe("device.state_changed", failing_handler());
    bus.subscribe("device.state_changed", counting_handler(count.clone()));

    let report = bus.publish("device.state_changed", json!({"id": "lamp"})).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_unsubscribe_removes_exactly_that_handler() {
    let bus = EventBus::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let h1 = counting_handler(first.clone());
    let h2 = counting_handler(second.clone());

    bus.subscribe("presence.changed", h1.clone());
    bus.subscribe("presence.changed", h2.clone());

    assert!(bus.unsubscribe("presence.changed", &h1));
    bus.publish("presence.changed", json!({})).await;

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unsubscribe_matches_identity_not_behaviour() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let subscribed = counting_handler(count.clone());
    let lookalike = counting_handler(count.clone());

    bus.subscribe("x", subscribed);
    assert!(!bus.unsubscribe("x", &lookalike));
    assert_eq!(bus.subscriber_count("x"), 1);
}

#[tokio::test]
async fn test_duplicate_subscription_runs_twice() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let handler = counting_handler(count.clone());

    bus.subscribe("tick", handler.clone());
    bus.subscribe("tick", handler.clone());
    bus.publish("tick", json!(null)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);

    // removes only the first occurrence
    assert!(bus.unsubscribe("tick", &handler));
    bus.publish("tick", json!(null)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unsubscribe_absent() {
    let bus = EventBus::new();
    assert!(!bus.unsubscribe("never", &failing_handler()));
}

#[tokio::test]
async fn test_handlers_run_in_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for tag in ["a", "b", "c"] {
        let order = order.clone();
        bus.subscribe(
            "ordered",
            event_fn(move |_, _| {
                let order = order.clone();
                async move {
                    order.lock().push(tag);
                    Ok(())
                }
            }),
        );
    }

    bus.publish("ordered", json!({})).await;
    assert_eq!(*order.lock(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_payload_delivered() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(None));
    let slot = seen.clone();

    bus.subscribe(
        "device.state_changed",
        event_fn(move |event_type, payload| {
            let slot = slot.clone();
            async move {
                *slot.lock() = Some((event_type, payload));
                Ok(())
            }
        }),
    );

    bus.publish("device.state_changed", json!({"id": "lamp", "state": "on"}))
        .await;
    let (event_type, payload) = seen.lock().clone().unwrap();
    assert_eq!(event_type, "device.state_changed");
    assert_eq!(payload["state"], "on");
}

#[tokio::test]
async fn test_events_are_routed_by_type() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    bus.subscribe("a", counting_handler(count.clone()));

    bus.publish("b", json!({})).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_event_types_listing() {
    let bus = EventBus::new();
    let handler = failing_handler();
    bus.subscribe("z.event", handler.clone());
    bus.subscribe("a.event", handler.clone());
    assert_eq!(bus.event_types(), vec!["a.event", "z.event"]);

    bus.unsubscribe("z.event", &handler);
    assert_eq!(bus.event_types(), vec!["a.event"]);
}

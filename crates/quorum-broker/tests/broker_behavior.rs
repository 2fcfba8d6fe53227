//! Behavior tests for the event brokers: fan-out, lossy delivery,
//! subscription lifecycle, and room cleanup.

use quorum_broker::{AppEventBroker, BrokerConfig, EventBroker};
use quorum_domain::{AppEvent, RoomEvent, VoteEvent};
use tokio::sync::mpsc::error::TryRecvError;

fn topic_event(topic: &str) -> RoomEvent {
    RoomEvent::TopicChanged {
        topic: topic.to_string(),
    }
}

#[tokio::test]
async fn test_publish_room_event_reaches_all_subscribers() {
    let broker = EventBroker::default();
    let (mut rx1, _sub1) = broker.subscribe_room_events("room1");
    let (mut rx2, _sub2) = broker.subscribe_room_events("room1");

    broker.publish_room_event("room1", topic_event("a"));

    assert_eq!(rx1.recv().await, Some(topic_event("a")));
    assert_eq!(rx2.recv().await, Some(topic_event("a")));
}

#[tokio::test]
async fn test_publish_other_room_not_delivered() {
    let broker = EventBroker::default();
    let (mut rx, _sub) = broker.subscribe_room_events("room1");

    broker.publish_room_event("room2", topic_event("a"));

    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_publish_full_queue_drops_event_silently() {
    let config = BrokerConfig {
        room_queue_capacity: 2,
        ..BrokerConfig::default()
    };
    let broker = EventBroker::new(config);
    let (mut slow_rx, _slow_sub) = broker.subscribe_room_events("room1");
    let (mut fast_rx, _fast_sub) = broker.subscribe_room_events("room1");

    // Three events into capacity-2 queues nobody is draining.
    broker.publish_room_event("room1", topic_event("a"));
    broker.publish_room_event("room1", topic_event("b"));
    broker.publish_room_event("room1", topic_event("c"));

    // Both subscribers keep the first two and lose the third.
    assert_eq!(slow_rx.recv().await, Some(topic_event("a")));
    assert_eq!(slow_rx.recv().await, Some(topic_event("b")));
    assert_eq!(slow_rx.try_recv(), Err(TryRecvError::Empty));

    // The broker is unaffected: later publishes still arrive.
    broker.publish_room_event("room1", topic_event("d"));
    fast_rx.recv().await;
    fast_rx.recv().await;
    assert_eq!(slow_rx.recv().await, Some(topic_event("d")));
}

#[tokio::test]
async fn test_publish_order_preserved_for_undropped_events() {
    let broker = EventBroker::default();
    let (mut rx, _sub) = broker.subscribe_room_events("room1");

    for topic in ["a", "b", "c", "d"] {
        broker.publish_room_event("room1", topic_event(topic));
    }

    for topic in ["a", "b", "c", "d"] {
        assert_eq!(rx.recv().await, Some(topic_event(topic)));
    }
}

#[tokio::test]
async fn test_drop_subscription_removes_subscriber() {
    let broker = EventBroker::default();
    let (_rx, sub) = broker.subscribe_room_events("room1");
    assert_eq!(broker.subscriber_counts(), (1, 0));

    drop(sub);
    assert_eq!(broker.subscriber_counts(), (0, 0));

    // Publishing to the now-empty room is a no-op.
    broker.publish_room_event("room1", topic_event("a"));
}

#[tokio::test]
async fn test_unsubscribe_after_cleanup_room_is_idempotent() {
    let broker = EventBroker::default();
    let (_rx, sub) = broker.subscribe_room_events("room1");

    broker.cleanup_room("room1");
    assert_eq!(broker.subscriber_counts(), (0, 0));

    // The guard's removal finds nothing; that must be fine.
    sub.unsubscribe();
    assert_eq!(broker.subscriber_counts(), (0, 0));
}

#[tokio::test]
async fn test_cleanup_room_ends_every_stream() {
    let broker = EventBroker::default();
    let (mut room_rx, _room_sub) = broker.subscribe_room_events("room1");
    let (mut vote_rx, _vote_sub) = broker.subscribe_vote_events("room1");
    let (mut other_rx, _other_sub) = broker.subscribe_room_events("room2");

    broker.cleanup_room("room1");

    assert_eq!(room_rx.recv().await, None);
    assert_eq!(vote_rx.recv().await, None);

    // room2 is untouched.
    broker.publish_room_event("room2", topic_event("a"));
    assert_eq!(other_rx.recv().await, Some(topic_event("a")));
}

#[tokio::test]
async fn test_dropped_receiver_pruned_on_publish() {
    let broker = EventBroker::default();
    let (rx, _sub) = broker.subscribe_room_events("room1");
    drop(rx);

    broker.publish_room_event("room1", topic_event("a"));
    assert_eq!(broker.subscriber_counts(), (0, 0));
}

#[tokio::test]
async fn test_room_and_vote_streams_are_independent() {
    let broker = EventBroker::default();
    let (mut room_rx, _room_sub) = broker.subscribe_room_events("room1");
    let (mut vote_rx, _vote_sub) = broker.subscribe_vote_events("room1");

    broker.publish_vote_event("room1", VoteEvent::Reset);

    assert_eq!(vote_rx.recv().await, Some(VoteEvent::Reset));
    assert_eq!(room_rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_app_event_broker_fans_out_to_all_subscribers() {
    let broker = AppEventBroker::default();
    let (mut rx1, _sub1) = broker.subscribe();
    let (mut rx2, _sub2) = broker.subscribe();

    broker.publish(AppEvent::room_created("r1", "brave-falcon-07", "Alice"));

    let event = rx1.recv().await.unwrap();
    assert_eq!(event.room_id, "r1");
    assert_eq!(event.kind.event_type(), "room_created");
    assert!(rx2.recv().await.is_some());
}

#[tokio::test]
async fn test_app_event_broker_unsubscribe_stops_delivery() {
    let broker = AppEventBroker::default();
    let (_rx, sub) = broker.subscribe();
    assert_eq!(broker.subscriber_count(), 1);

    sub.unsubscribe();
    assert_eq!(broker.subscriber_count(), 0);
}

#[tokio::test]
async fn test_app_event_broker_full_queue_drops_silently() {
    let config = BrokerConfig {
        app_queue_capacity: 1,
        ..BrokerConfig::default()
    };
    let broker = AppEventBroker::new(config);
    let (mut rx, _sub) = broker.subscribe();

    broker.publish(AppEvent::room_closed("r1", "n", "one"));
    broker.publish(AppEvent::room_closed("r1", "n", "two"));

    let AppEvent { kind, .. } = rx.recv().await.unwrap();
    assert_eq!(kind, quorum_domain::AppEventKind::RoomClosed { reason: "one".to_string() });
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

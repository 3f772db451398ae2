use peerwatch_bus::{BusError, ClusterBus};
use peerwatch_protocol::Topic;

#[tokio::test]
async fn test_publish_reaches_subscriber() {
    let bus = ClusterBus::new(16);
    let mut sub = bus.subscribe(&[Topic::Heartbeat]);

    bus.publish(Topic::Heartbeat, "hb".into());

    let env = sub.recv().await.unwrap();
    assert_eq!(env.topic, Topic::Heartbeat);
    assert_eq!(env.payload, "hb");
}

#[tokio::test]
async fn test_subscription_filters_topics() {
    let bus = ClusterBus::new(16);
    let mut sub = bus.subscribe(&[Topic::Death]);

    bus.publish(Topic::Heartbeat, "hb".into());
    bus.publish(Topic::Election, "ballot".into());
    bus.publish(Topic::Death, "dead".into());

    let env = sub.recv().await.unwrap();
    assert_eq!(env.topic, Topic::Death);
    assert_eq!(env.payload, "dead");
}

#[tokio::test]
async fn test_fanout_to_multiple_subscribers() {
    let bus = ClusterBus::new(16);
    let mut a = bus.subscribe(&[Topic::Promotion]);
    let mut b = bus.subscribe(&[Topic::Promotion]);

    bus.publish(Topic::Promotion, "promote".into());

    assert_eq!(a.recv().await.unwrap().payload, "promote");
    assert_eq!(b.recv().await.unwrap().payload, "promote");
}

#[tokio::test]
async fn test_publisher_sees_own_messages() {
    // Nodes learn their own liveness the same way peers do, by receiving
    // their own heartbeat back from the bus.
    let bus = ClusterBus::new(16);
    let mut sub = bus.subscribe(&Topic::ALL);

    bus.publish(Topic::Heartbeat, "self".into());
    assert_eq!(sub.recv().await.unwrap().payload, "self");
}

#[tokio::test]
async fn test_publish_without_subscribers_does_not_panic() {
    let bus = ClusterBus::new(16);
    bus.publish(Topic::Heartbeat, "nobody listening".into());
}

#[tokio::test]
async fn test_recv_after_all_handles_dropped_is_closed() {
    let bus = ClusterBus::new(16);
    let mut sub = bus.subscribe(&[Topic::Heartbeat]);
    drop(bus);

    assert!(matches!(sub.recv().await, Err(BusError::Closed)));
}

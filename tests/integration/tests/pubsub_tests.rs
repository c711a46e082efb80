//! Pub/Sub Integration Tests
//!
//! These tests require:
//! - Running Redis instance
//! - Environment variables: REDIS_URL (optionally REDIS_READ_TIMEOUT_MS)
//!
//! Run with: cargo test -p integration-tests --test pubsub_tests

use std::time::Duration;

use integration_tests::{check_test_env, fixtures::*, publisher, subscriber, test_config};
use pubsub_client::{connect, EventKind, RedisPool, SubClient, SubscriptionError, DEFAULT_STREAM_BUFFER};

// ============================================================================
// Channel Subscriptions
// ============================================================================

#[tokio::test]
async fn test_subscribe_publish_receive_unsubscribe() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("subTestChannel");
    let mut client = subscriber().expect("Failed to connect subscriber");
    let publisher = publisher().expect("Failed to create publisher");

    let ack = client.subscribe(&[channel.as_str()]).unwrap();
    assert_eq!(ack.kind(), EventKind::Subscribe);
    assert_eq!(ack.channel(), Some(channel.as_str()));
    assert_eq!(ack.subscription_count(), Some(1));

    let receivers = publisher.publish(&channel, "Hello, World!").await.unwrap();
    assert_eq!(receivers, 1);

    let event = client.receive().unwrap();
    assert_eq!(event.kind(), EventKind::Message);
    assert_eq!(event.channel(), Some(channel.as_str()));
    assert_eq!(event.payload(), Some(b"Hello, World!".as_slice()));

    let ack = client.unsubscribe(&[channel.as_str()]).unwrap();
    assert_eq!(ack.kind(), EventKind::Unsubscribe);
    assert_eq!(ack.subscription_count(), Some(0));
}

#[tokio::test]
async fn test_binary_payload_is_exact() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("binary");
    let mut client = subscriber().unwrap();
    let publisher = publisher().unwrap();
    client.subscribe(&[channel.as_str()]).unwrap();

    let payload: Vec<u8> = vec![0x00, 0xff, 0xfe, b'\r', b'\n', 0x80];
    publisher.publish(&channel, payload.as_slice()).await.unwrap();

    let event = client.receive().unwrap();
    assert_eq!(event.payload(), Some(payload.as_slice()));
    assert_eq!(event.payload_str(), None);
}

#[tokio::test]
async fn test_subscribe_many_counts_increase() {
    if !check_test_env() {
        return;
    }

    let channels: Vec<String> = (0..3).map(|_| unique_channel("multi")).collect();
    let names: Vec<&str> = channels.iter().map(String::as_str).collect();
    let mut client = subscriber().unwrap();

    let acks = client.subscribe_all(&names).unwrap();
    let counts: Vec<_> = acks.iter().map(|a| a.subscription_count()).collect();
    assert_eq!(counts, vec![Some(1), Some(2), Some(3)]);

    let acks = client.unsubscribe_all(&names).unwrap();
    assert_eq!(acks.last().unwrap().subscription_count(), Some(0));
}

#[tokio::test]
async fn test_unsubscribe_everything() {
    if !check_test_env() {
        return;
    }

    let channels: Vec<String> = (0..3).map(|_| unique_channel("all")).collect();
    let names: Vec<&str> = channels.iter().map(String::as_str).collect();
    let mut client = subscriber().unwrap();
    client.subscribe(&names).unwrap();

    let acks = client.unsubscribe_all(&[]).unwrap();
    assert_eq!(acks.len(), 3);
    assert!(acks.iter().all(|a| a.kind() == EventKind::Unsubscribe));
    assert_eq!(acks.last().unwrap().subscription_count(), Some(0));

    // Nothing left: the store answers with a single nil-channel ack
    let ack = client.unsubscribe(&[]).unwrap();
    assert_eq!(ack.channel(), None);
    assert_eq!(ack.subscription_count(), Some(0));
}

// ============================================================================
// Pattern Subscriptions
// ============================================================================

#[tokio::test]
async fn test_pattern_message() {
    if !check_test_env() {
        return;
    }

    let prefix = unique_channel("pattern");
    let pattern = format!("{prefix}.*");
    let channel = format!("{prefix}.news");

    let mut client = subscriber().unwrap();
    let publisher = publisher().unwrap();

    let ack = client.psubscribe(&[pattern.as_str()]).unwrap();
    assert_eq!(ack.kind(), EventKind::Subscribe);
    assert_eq!(ack.pattern(), Some(pattern.as_str()));
    assert_eq!(ack.subscription_count(), Some(1));

    publisher.publish(&channel, "matched").await.unwrap();

    let event = client.receive().unwrap();
    assert_eq!(event.kind(), EventKind::PMessage);
    assert_eq!(event.pattern(), Some(pattern.as_str()));
    assert_eq!(event.channel(), Some(channel.as_str()));
    assert_eq!(event.payload_str(), Some("matched"));

    let ack = client.punsubscribe(&[pattern.as_str()]).unwrap();
    assert_eq!(ack.kind(), EventKind::Unsubscribe);
    assert_eq!(ack.subscription_count(), Some(0));
}

#[tokio::test]
async fn test_channels_and_patterns_share_count() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("mixed");
    let pattern = format!("{channel}*");
    let mut client = subscriber().unwrap();

    assert_eq!(client.subscribe(&[channel.as_str()]).unwrap().subscription_count(), Some(1));
    assert_eq!(client.psubscribe(&[pattern.as_str()]).unwrap().subscription_count(), Some(2));

    // Both subscriptions match, so one publish arrives twice
    let publisher = publisher().unwrap();
    assert_eq!(publisher.publish(&channel, "twice").await.unwrap(), 2);

    let mut kinds = vec![client.receive().unwrap().kind(), client.receive().unwrap().kind()];
    kinds.sort_by_key(ToString::to_string);
    assert_eq!(kinds, vec![EventKind::Message, EventKind::PMessage]);
}

// ============================================================================
// Receive Behaviour
// ============================================================================

#[tokio::test]
async fn test_ping_while_subscribed() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("ping");
    let mut client = subscriber().unwrap();
    let publisher = publisher().unwrap();

    client.subscribe(&[channel.as_str()]).unwrap();
    client.ping(Some("still here")).unwrap();

    publisher.publish(&channel, "after ping").await.unwrap();
    let event = client.receive_message().unwrap();
    assert_eq!(event.payload_str(), Some("after ping"));
}

#[tokio::test]
async fn test_idle_receive_times_out() {
    if !check_test_env() {
        return;
    }

    let config = test_config()
        .unwrap()
        .with_read_timeout(Duration::from_millis(200));
    let channel = unique_channel("idle");
    let mut client = SubClient::new(connect(&config).unwrap());
    client.subscribe(&[channel.as_str()]).unwrap();

    let err = client.receive().unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");

    // The connection would now drop the next reply, so the client refuses to read
    publisher().unwrap().publish(&channel, "late").await.unwrap();
    assert!(matches!(client.receive(), Err(SubscriptionError::Unusable)));
    assert!(!client.is_usable());
}

#[tokio::test]
async fn test_json_payload() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("json");
    let mut client = subscriber().unwrap();
    let publisher = publisher().unwrap();
    client.subscribe(&[channel.as_str()]).unwrap();

    let line = ChatLine::sample();
    publisher.publish_json(&channel, &line).await.unwrap();

    let event = client.receive().unwrap();
    let decoded: ChatLine = event.payload_json().unwrap().unwrap();
    assert_eq!(decoded, line);
}

// ============================================================================
// Event Stream
// ============================================================================

#[tokio::test]
async fn test_event_stream_delivery() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("stream");
    let mut client = subscriber().unwrap();
    let publisher = publisher().unwrap();
    client.subscribe(&[channel.as_str()]).unwrap();

    let mut stream = client.into_event_stream(DEFAULT_STREAM_BUFFER);
    for i in 0..3 {
        publisher.publish(&channel, format!("msg-{i}")).await.unwrap();
    }

    for i in 0..3 {
        let event = tokio::time::timeout(Duration::from_secs(5), stream.recv())
            .await
            .expect("timed out waiting for event")
            .expect("stream closed")
            .unwrap();
        assert_eq!(event.payload_str(), Some(format!("msg-{i}").as_str()));
    }
}

// ============================================================================
// Publisher Introspection
// ============================================================================

#[tokio::test]
async fn test_pool_health_check() {
    if !check_test_env() {
        return;
    }

    let config = test_config().unwrap();
    let pool = RedisPool::from_config(&config).expect("Failed to create pool");
    pool.health_check().await.unwrap();
    assert!(pool.status().size >= 1);
}

#[tokio::test]
async fn test_pubsub_introspection() {
    if !check_test_env() {
        return;
    }

    let channel = unique_channel("introspect");
    let mut client = subscriber().unwrap();
    let publisher = publisher().unwrap();
    client.subscribe(&[channel.as_str()]).unwrap();

    let counts = publisher.num_subscribers(&[channel.as_str()]).await.unwrap();
    assert_eq!(counts, vec![(channel.clone(), 1)]);

    let active = publisher.active_channels(Some(channel.as_str())).await.unwrap();
    assert_eq!(active, vec![channel.clone()]);

    let pattern = format!("{channel}*");
    client.psubscribe(&[pattern.as_str()]).unwrap();
    assert!(publisher.num_patterns().await.unwrap() >= 1);
}

use std::sync::Arc;

use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use meetpoint::event::EventBus;
use meetpoint::event::SubscriptionCreatedEvent;
use meetpoint::locale::MessageKey;
use meetpoint::mail::Mailer;
use meetpoint::repository::Repository;
use meetpoint::service::error::ServiceError;
use meetpoint::service::subscription_service::SubscriptionService;
use meetpoint::subscriber::subscription_mail_subscriber::SubscriptionMailSubscriber;

mod common;

fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
}

fn setup_service(db: Arc<Repository>) -> (SubscriptionService, Arc<common::FixedClock>) {
    let clock = common::FixedClock::new(base_time());
    let event_bus = Arc::new(EventBus::new());
    (
        SubscriptionService::new(db, clock.clone(), event_bus),
        clock,
    )
}

/// Service wired with a mail subscriber recording deliveries.
fn setup_service_with_mail(
    db: Arc<Repository>,
) -> (
    SubscriptionService,
    Arc<common::FixedClock>,
    Arc<common::RecordingMailTransport>,
) {
    let clock = common::FixedClock::new(base_time());
    let event_bus = Arc::new(EventBus::new());
    let transport = common::RecordingMailTransport::new();

    let mail_subscriber = Arc::new(SubscriptionMailSubscriber::new(
        Arc::new(Mailer::new()),
        transport.clone(),
    ));
    event_bus.register_subscriber::<SubscriptionCreatedEvent, _>(mail_subscriber);

    (
        SubscriptionService::new(db, clock.clone(), event_bus),
        clock,
        transport,
    )
}

#[tokio::test]
async fn subscription_check_sequence() {
    let (db, db_path) = common::setup_db().await;
    let (service, clock) = setup_service(db.clone());

    let alice = common::create_user(&db, "Alice", "alice@example.com").await;
    let bob = common::create_user(&db, "Bob", "bob@example.com").await;
    let banner = common::create_file(&db, "banner.png").await;
    let meetup = common::create_meetup(
        &db,
        alice.id,
        banner.id,
        "Launch",
        base_time() + Duration::days(1),
    )
    .await;

    // Unknown meetup
    let err = service.create(bob.id, 9999).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            key: MessageKey::MeetupNotFound
        }
    ));

    // The organizer can never subscribe to their own meetup
    let err = service.create(alice.id, meetup.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden {
            key: MessageKey::OwnMeetupSubscription
        }
    ));

    // Success for anyone else
    let subscription = service
        .create(bob.id, meetup.id)
        .await
        .expect("Failed to subscribe");
    assert!(subscription.id > 0);
    assert_eq!(subscription.subscriber_id, bob.id);
    assert_eq!(subscription.meetup_id, meetup.id);

    // Identical second attempt is a duplicate
    let err = service.create(bob.id, meetup.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Conflict {
            key: MessageKey::AlreadySubscribed
        }
    ));

    // Once the meetup has ended nobody can subscribe
    let carol = common::create_user(&db, "Carol", "carol@example.com").await;
    clock.set(base_time() + Duration::days(2));
    let err = service.create(carol.id, meetup.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Expired {
            key: MessageKey::MeetupEnded
        }
    ));

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn rejects_two_meetups_at_the_same_time() {
    let (db, db_path) = common::setup_db().await;
    let (service, _clock) = setup_service(db.clone());

    let alice = common::create_user(&db, "Alice", "alice@example.com").await;
    let bob = common::create_user(&db, "Bob", "bob@example.com").await;
    let carol = common::create_user(&db, "Carol", "carol@example.com").await;
    let banner = common::create_file(&db, "banner.png").await;

    let slot = base_time() + Duration::days(3);
    let first = common::create_meetup(&db, alice.id, banner.id, "First", slot).await;
    let second = common::create_meetup(&db, bob.id, banner.id, "Second", slot).await;
    let later = common::create_meetup(
        &db,
        bob.id,
        banner.id,
        "Later",
        slot + Duration::hours(2),
    )
    .await;

    service
        .create(carol.id, first.id)
        .await
        .expect("Failed to subscribe");

    // Same timestamp, different meetup: time-slot exclusivity kicks in with
    // its own message, distinct from the duplicate conflict.
    let err = service.create(carol.id, second.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Conflict {
            key: MessageKey::SameTimeSubscription
        }
    ));

    // A different timestamp is fine.
    service
        .create(carol.id, later.id)
        .await
        .expect("Failed to subscribe to the later meetup");

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn lists_only_upcoming_subscriptions() {
    let (db, db_path) = common::setup_db().await;
    let (service, clock) = setup_service(db.clone());

    let alice = common::create_user(&db, "Alice", "alice@example.com").await;
    let bob = common::create_user(&db, "Bob", "bob@example.com").await;
    let banner = common::create_file(&db, "banner.png").await;

    let soon = common::create_meetup(
        &db,
        alice.id,
        banner.id,
        "Soon",
        base_time() + Duration::hours(6),
    )
    .await;
    let next_week = common::create_meetup(
        &db,
        alice.id,
        banner.id,
        "Next week",
        base_time() + Duration::days(7),
    )
    .await;

    service.create(bob.id, next_week.id).await.unwrap();
    service.create(bob.id, soon.id).await.unwrap();

    // Both upcoming, ordered by meetup date ascending.
    let (listed, total) = service.list(bob.id, 1, 10).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(listed[0].title, "Soon");
    assert_eq!(listed[1].title, "Next week");
    assert_eq!(listed[0].organizer_name, "Alice");
    assert_eq!(listed[0].banner.name, "banner.png");

    // After the first one happened only the second shows up.
    clock.set(base_time() + Duration::days(1));
    let (listed, total) = service.list(bob.id, 1, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(listed[0].title, "Next week");

    // Another user sees nothing.
    let (listed, total) = service.list(alice.id, 1, 10).await.unwrap();
    assert!(listed.is_empty());
    assert_eq!(total, 0);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn cancel_enforces_ownership_and_dates() {
    let (db, db_path) = common::setup_db().await;
    let (service, clock) = setup_service(db.clone());

    let alice = common::create_user(&db, "Alice", "alice@example.com").await;
    let bob = common::create_user(&db, "Bob", "bob@example.com").await;
    let carol = common::create_user(&db, "Carol", "carol@example.com").await;
    let banner = common::create_file(&db, "banner.png").await;
    let meetup = common::create_meetup(
        &db,
        alice.id,
        banner.id,
        "Launch",
        base_time() + Duration::days(1),
    )
    .await;

    let subscription = service.create(bob.id, meetup.id).await.unwrap();

    let err = service.delete(bob.id, 9999).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            key: MessageKey::SubscriptionNotFound
        }
    ));

    // Only the subscriber may cancel
    let err = service.delete(carol.id, subscription.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden {
            key: MessageKey::SubscriptionCancelForbidden
        }
    ));

    // Not after the meetup happened
    clock.set(base_time() + Duration::days(2));
    let err = service.delete(bob.id, subscription.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Expired {
            key: MessageKey::SubscriptionCancelPast
        }
    ));

    // Before it, the subscriber can; deletion has no further side effects.
    clock.set(base_time());
    service
        .delete(bob.id, subscription.id)
        .await
        .expect("Failed to cancel");
    let (listed, _) = service.list(bob.id, 1, 10).await.unwrap();
    assert!(listed.is_empty());

    // And the slot is free to re-subscribe.
    service.create(bob.id, meetup.id).await.unwrap();

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn notifies_the_organizer_exactly_once() {
    let (db, db_path) = common::setup_db().await;
    let (service, _clock, transport) = setup_service_with_mail(db.clone());

    let alice = common::create_user(&db, "Alice", "alice@example.com").await;
    let bob = common::create_user(&db, "Bob", "bob@example.com").await;
    let banner = common::create_file(&db, "banner.png").await;
    let meetup = common::create_meetup(
        &db,
        alice.id,
        banner.id,
        "Launch",
        base_time() + Duration::days(1),
    )
    .await;

    service.create(bob.id, meetup.id).await.unwrap();

    common::wait_until("the subscription mail", || transport.sent_count() == 1).await;
    {
        let sent = transport.sent.read().unwrap();
        assert_eq!(sent[0].to_email, "alice@example.com");
        assert!(sent[0].body.contains("Bob"));
        assert!(sent[0].body.contains("Launch"));
    }

    // A rejected attempt publishes nothing.
    let _ = service.create(bob.id, meetup.id).await.unwrap_err();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(transport.sent_count(), 1);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn transport_failure_does_not_fail_the_subscription() {
    let (db, db_path) = common::setup_db().await;
    let (service, _clock, transport) = setup_service_with_mail(db.clone());
    transport.set_fail(true);

    let alice = common::create_user(&db, "Alice", "alice@example.com").await;
    let bob = common::create_user(&db, "Bob", "bob@example.com").await;
    let banner = common::create_file(&db, "banner.png").await;
    let meetup = common::create_meetup(
        &db,
        alice.id,
        banner.id,
        "Launch",
        base_time() + Duration::days(1),
    )
    .await;

    // The subscription is committed even though delivery will fail.
    let subscription = service.create(bob.id, meetup.id).await.unwrap();
    assert!(subscription.id > 0);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(transport.sent_count(), 0);

    let (listed, _) = service.list(bob.id, 1, 10).await.unwrap();
    assert_eq!(listed.len(), 1);

    common::teardown_db(db_path).await;
}

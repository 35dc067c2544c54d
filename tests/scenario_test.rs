//! The full user journey: registration, meetup creation, subscriptions.

use std::sync::Arc;

use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use meetpoint::event::EventBus;
use meetpoint::locale::MessageKey;
use meetpoint::model::MeetupUpdate;
use meetpoint::service::Services;
use meetpoint::service::error::ServiceError;
use meetpoint::service::meetup_service::NewMeetup;
use meetpoint::service::user_service::NewUser;

mod common;

#[tokio::test]
async fn register_create_subscribe_journey() {
    let (db, db_path) = common::setup_db().await;

    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    let clock = common::FixedClock::new(now);
    let services = Services::new(
        db.clone(),
        clock.clone(),
        Arc::new(EventBus::new()),
        std::env::temp_dir().join(format!("meetpoint-uploads-{}", uuid::Uuid::new_v4())),
    );

    // Two accounts.
    let alice = services
        .user
        .register(NewUser {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "123456".to_string(),
        })
        .await
        .expect("Failed to register A");
    let bob = services
        .user
        .register(NewUser {
            name: "B".to_string(),
            email: "b@x.com".to_string(),
            password: "123456".to_string(),
        })
        .await
        .expect("Failed to register B");

    // A uploads a banner and creates "Launch" for tomorrow.
    let banner = services
        .file
        .store("banner.png", b"\x89PNG fake image bytes")
        .await
        .expect("Failed to store banner");

    let tomorrow = now + Duration::days(1);
    let meetup = services
        .meetup
        .create(
            alice.id,
            NewMeetup {
                title: "Launch".to_string(),
                description: "Launch party".to_string(),
                location: "HQ".to_string(),
                date: tomorrow,
                banner_id: banner.id,
            },
        )
        .await
        .expect("Failed to create meetup");

    // B subscribes.
    let subscription = services
        .subscription
        .create(bob.id, meetup.id)
        .await
        .expect("Failed to subscribe");
    assert!(subscription.id > 0);

    // B again: duplicate.
    let err = services
        .subscription
        .create(bob.id, meetup.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Conflict {
            key: MessageKey::AlreadySubscribed
        }
    ));

    // A tries to subscribe to their own meetup.
    let err = services
        .subscription
        .create(alice.id, meetup.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden {
            key: MessageKey::OwnMeetupSubscription
        }
    ));

    // A tries to move the date to yesterday.
    let err = services
        .meetup
        .update(
            alice.id,
            meetup.id,
            MeetupUpdate {
                date: Some(now - Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PastDate {
            key: MessageKey::PastDateNotAllowed
        }
    ));

    // B's listing shows the subscription with meetup, organizer, and banner.
    let (subscriptions, total) = services.subscription.list(bob.id, 1, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(subscriptions[0].title, "Launch");
    assert_eq!(subscriptions[0].organizer_name, "A");
    assert_eq!(subscriptions[0].banner.name, "banner.png");

    common::teardown_db(db_path).await;
}

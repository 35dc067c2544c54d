//! Subscription ledger: the check sequence, race-safe insert, notification.

use std::sync::Arc;

use log::warn;

use crate::clock::Clock;
use crate::event::EventBus;
use crate::event::SubscriptionCreatedEvent;
use crate::locale::MessageKey;
use crate::model::MeetupModel;
use crate::model::SubscriptionDetail;
use crate::model::SubscriptionModel;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Service enforcing the subscription invariants.
pub struct SubscriptionService {
    pub db: Arc<Repository>,
    pub clock: Arc<dyn Clock>,
    pub event_bus: Arc<EventBus>,
}

impl SubscriptionService {
    pub fn new(db: Arc<Repository>, clock: Arc<dyn Clock>, event_bus: Arc<EventBus>) -> Self {
        Self { db, clock, event_bus }
    }

    /// Subscribes a user to a meetup.
    ///
    /// Checks run in a fixed order, each short-circuiting with its own error:
    /// existence, self-subscription, past event, duplicate, time-slot
    /// collision. The duplicate pre-check is only the fast path; the UNIQUE
    /// constraint on (subscriber_id, meetup_id) decides races, and a lost
    /// race maps to the same duplicate conflict.
    ///
    /// On success exactly one notification job is published; a failure on
    /// that path is logged and never rolls back the subscription.
    ///
    /// # Performance
    /// * DB calls: 4 + 2
    pub async fn create(
        &self,
        subscriber_id: i64,
        meetup_id: i64,
    ) -> Result<SubscriptionModel, ServiceError> {
        // DB 1
        let meetup =
            self.db
                .meetup_table
                .select(&meetup_id)
                .await?
                .ok_or(ServiceError::NotFound {
                    key: MessageKey::MeetupNotFound,
                })?;

        if meetup.organizer_id == subscriber_id {
            return Err(ServiceError::Forbidden {
                key: MessageKey::OwnMeetupSubscription,
            });
        }

        if meetup.date <= self.clock.now() {
            return Err(ServiceError::Expired {
                key: MessageKey::MeetupEnded,
            });
        }

        // DB 1
        if self
            .db
            .subscription_table
            .select_by_subscriber_and_meetup(subscriber_id, meetup_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict {
                key: MessageKey::AlreadySubscribed,
            });
        }

        // DB 1
        if self
            .db
            .subscription_table
            .exists_by_subscriber_and_date(subscriber_id, &meetup.date)
            .await?
        {
            return Err(ServiceError::Conflict {
                key: MessageKey::SameTimeSubscription,
            });
        }

        let mut subscription = SubscriptionModel {
            id: 0,
            subscriber_id,
            meetup_id,
        };
        // DB 1
        subscription.id = self
            .db
            .subscription_table
            .insert(&subscription)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ServiceError::Conflict {
                        key: MessageKey::AlreadySubscribed,
                    }
                } else {
                    e.into()
                }
            })?;

        // DB 2
        if let Err(e) = self.publish_created(&meetup, subscriber_id).await {
            warn!(
                "Subscription id `{}` created but notification publish failed: {e}",
                subscription.id
            );
        }

        Ok(subscription)
    }

    /// The subscriber's upcoming subscriptions, meetup date ascending.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn list(
        &self,
        subscriber_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<SubscriptionDetail>, i64), ServiceError> {
        let page = page.max(1) - 1;
        let now = self.clock.now();

        // DB 1
        let rows = self
            .db
            .subscription_table
            .select_paginated_upcoming_by_subscriber_id(subscriber_id, &now, page, per_page)
            .await?;
        // DB 1
        let total = self
            .db
            .subscription_table
            .count_upcoming_by_subscriber_id(subscriber_id, &now)
            .await?;

        Ok((rows.into_iter().map(SubscriptionDetail::from).collect(), total))
    }

    /// Cancels a subscription owned by the caller, before the meetup starts.
    ///
    /// # Performance
    /// * DB calls: 3
    pub async fn delete(
        &self,
        subscriber_id: i64,
        subscription_id: i64,
    ) -> Result<(), ServiceError> {
        // DB 1
        let subscription = self
            .db
            .subscription_table
            .select(&subscription_id)
            .await?
            .ok_or(ServiceError::NotFound {
                key: MessageKey::SubscriptionNotFound,
            })?;

        if subscription.subscriber_id != subscriber_id {
            return Err(ServiceError::Forbidden {
                key: MessageKey::SubscriptionCancelForbidden,
            });
        }

        // DB 1
        let meetup = self
            .db
            .meetup_table
            .select(&subscription.meetup_id)
            .await?
            .ok_or(ServiceError::NotFound {
                key: MessageKey::MeetupNotFound,
            })?;

        if meetup.date <= self.clock.now() {
            return Err(ServiceError::Expired {
                key: MessageKey::SubscriptionCancelPast,
            });
        }

        // DB 1
        self.db.subscription_table.delete(&subscription_id).await?;
        Ok(())
    }

    /// Loads the two parties and publishes the notification event.
    ///
    /// Runs after the subscription is committed; any failure here is the
    /// caller's to log, never to propagate.
    async fn publish_created(
        &self,
        meetup: &MeetupModel,
        subscriber_id: i64,
    ) -> Result<(), ServiceError> {
        // DB 1
        let organizer = self
            .db
            .user_table
            .select(&meetup.organizer_id)
            .await?
            .ok_or(ServiceError::UnexpectedResult {
                message: format!("Organizer id `{}` missing for meetup", meetup.organizer_id),
            })?;
        // DB 1
        let subscriber =
            self.db
                .user_table
                .select(&subscriber_id)
                .await?
                .ok_or(ServiceError::UnexpectedResult {
                    message: format!("Subscriber id `{subscriber_id}` missing"),
                })?;

        self.event_bus.publish(SubscriptionCreatedEvent {
            meetup: Arc::new(meetup.clone()),
            organizer: Arc::new(organizer),
            subscriber: Arc::new(subscriber),
        });

        Ok(())
    }
}

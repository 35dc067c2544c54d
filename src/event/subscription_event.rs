use std::sync::Arc;

use crate::model::MeetupModel;
use crate::model::UserModel;

/// Event fired when a subscription is successfully created.
///
/// Carries everything the notification needs so subscribers never touch the
/// database: the meetup, its organizer (the mail recipient), and the new
/// subscriber.
#[derive(Clone, Debug)]
pub struct SubscriptionCreatedEvent {
    pub meetup: Arc<MeetupModel>,
    pub organizer: Arc<UserModel>,
    pub subscriber: Arc<UserModel>,
}

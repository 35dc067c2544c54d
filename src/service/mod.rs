use std::path::PathBuf;
use std::sync::Arc;

use crate::clock::Clock;
use crate::event::EventBus;
use crate::repository::Repository;
use crate::service::file_service::FileService;
use crate::service::meetup_service::MeetupService;
use crate::service::subscription_service::SubscriptionService;
use crate::service::user_service::UserService;

pub mod error;
pub mod file_service;
pub mod meetup_service;
pub mod subscription_service;
pub mod user_service;

pub struct Services {
    pub user: Arc<UserService>,
    pub meetup: Arc<MeetupService>,
    pub subscription: Arc<SubscriptionService>,
    pub file: Arc<FileService>,
}

impl Services {
    pub fn new(
        db: Arc<Repository>,
        clock: Arc<dyn Clock>,
        event_bus: Arc<EventBus>,
        uploads_path: PathBuf,
    ) -> Self {
        Self {
            user: Arc::new(UserService::new(db.clone(), clock.clone())),
            meetup: Arc::new(MeetupService::new(db.clone(), clock.clone())),
            subscription: Arc::new(SubscriptionService::new(
                db.clone(),
                clock.clone(),
                event_bus,
            )),
            file: Arc::new(FileService::new(db, clock, uploads_path)),
        }
    }
}

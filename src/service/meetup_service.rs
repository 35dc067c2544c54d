//! Meetup lifecycle rules: creation, partial update, cancellation, listings.

use std::sync::Arc;

use crate::clock::Clock;
use crate::locale::MessageKey;
use crate::model::MeetupDetail;
use crate::model::MeetupListOpt;
use crate::model::MeetupModel;
use crate::model::MeetupUpdate;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

pub struct NewMeetup {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub banner_id: i64,
}

/// Service enforcing the meetup date and ownership invariants.
pub struct MeetupService {
    pub db: Arc<Repository>,
    pub clock: Arc<dyn Clock>,
}

impl MeetupService {
    pub fn new(db: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Creates a meetup for the given organizer.
    ///
    /// The banner is checked for existence before the write; the foreign key
    /// constraint stays on as a second line against a concurrent banner
    /// delete.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn create(
        &self,
        organizer_id: i64,
        new_meetup: NewMeetup,
    ) -> Result<MeetupModel, ServiceError> {
        Self::validate_fields(&new_meetup.title, &new_meetup.description, &new_meetup.location)?;

        if new_meetup.date <= self.clock.now() {
            return Err(ServiceError::PastDate {
                key: MessageKey::PastDateNotAllowed,
            });
        }

        // DB 1
        if self.db.file_table.select(&new_meetup.banner_id).await?.is_none() {
            return Err(ServiceError::Validation {
                key: MessageKey::InvalidBanner,
            });
        }

        let mut meetup = MeetupModel {
            id: 0,
            title: new_meetup.title,
            description: new_meetup.description,
            location: new_meetup.location,
            date: new_meetup.date,
            banner_id: new_meetup.banner_id,
            organizer_id,
        };
        // DB 1
        meetup.id = self
            .db
            .meetup_table
            .insert(&meetup)
            .await
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    ServiceError::Validation {
                        key: MessageKey::InvalidBanner,
                    }
                } else {
                    e.into()
                }
            })?;

        Ok(meetup)
    }

    /// Applies a partial update, subject to ownership and the two date rules:
    /// a meetup that already happened is frozen, and the new date (when
    /// given) must still be in the future.
    ///
    /// # Performance
    /// * DB calls: 2 + 1?
    pub async fn update(
        &self,
        organizer_id: i64,
        meetup_id: i64,
        fields: MeetupUpdate,
    ) -> Result<MeetupModel, ServiceError> {
        // DB 1
        let mut meetup =
            self.db
                .meetup_table
                .select(&meetup_id)
                .await?
                .ok_or(ServiceError::NotFound {
                    key: MessageKey::MeetupNotFound,
                })?;

        if meetup.organizer_id != organizer_id {
            return Err(ServiceError::Forbidden {
                key: MessageKey::MeetupEditForbidden,
            });
        }

        let now = self.clock.now();
        if meetup.date <= now {
            return Err(ServiceError::PastDate {
                key: MessageKey::MeetupEditPast,
            });
        }
        if let Some(date) = fields.date {
            if date <= now {
                return Err(ServiceError::PastDate {
                    key: MessageKey::PastDateNotAllowed,
                });
            }
            meetup.date = date;
        }

        if let Some(banner_id) = fields.banner_id
            && banner_id != meetup.banner_id
        {
            // DB 1?
            if self.db.file_table.select(&banner_id).await?.is_none() {
                return Err(ServiceError::Validation {
                    key: MessageKey::InvalidBanner,
                });
            }
            meetup.banner_id = banner_id;
        }

        if let Some(title) = fields.title {
            meetup.title = title;
        }
        if let Some(description) = fields.description {
            meetup.description = description;
        }
        if let Some(location) = fields.location {
            meetup.location = location;
        }
        Self::validate_fields(&meetup.title, &meetup.description, &meetup.location)?;

        // DB 1
        self.db.meetup_table.update(&meetup).await?;
        Ok(meetup)
    }

    /// Cancels a future meetup owned by the caller.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn delete(&self, organizer_id: i64, meetup_id: i64) -> Result<(), ServiceError> {
        // DB 1
        let meetup =
            self.db
                .meetup_table
                .select(&meetup_id)
                .await?
                .ok_or(ServiceError::NotFound {
                    key: MessageKey::MeetupNotFound,
                })?;

        if meetup.organizer_id != organizer_id {
            return Err(ServiceError::Forbidden {
                key: MessageKey::MeetupCancelForbidden,
            });
        }

        if meetup.date <= self.clock.now() {
            return Err(ServiceError::PastDate {
                key: MessageKey::MeetupCancelPast,
            });
        }

        // DB 1
        self.db.meetup_table.delete(&meetup_id).await?;
        Ok(())
    }

    /// Paginated listing, optionally filtered to one UTC calendar day.
    ///
    /// Returns the page plus the total count for the filter; an out-of-range
    /// page is an empty page, not an error.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn list(&self, opts: &MeetupListOpt) -> Result<(Vec<MeetupDetail>, i64), ServiceError> {
        // DB 1
        let rows = self.db.meetup_table.select_paginated(opts).await?;
        // DB 1
        let total = self.db.meetup_table.count(opts).await?;

        Ok((rows.into_iter().map(MeetupDetail::from).collect(), total))
    }

    /// Meetups organized by the caller, date ascending.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn list_organizing(
        &self,
        organizer_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<MeetupDetail>, i64), ServiceError> {
        let page = page.max(1) - 1;

        // DB 1
        let rows = self
            .db
            .meetup_table
            .select_paginated_by_organizer_id(organizer_id, page, per_page)
            .await?;
        // DB 1
        let total = self.db.meetup_table.count_by_organizer_id(organizer_id).await?;

        Ok((rows.into_iter().map(MeetupDetail::from).collect(), total))
    }

    fn validate_fields(title: &str, description: &str, location: &str) -> Result<(), ServiceError> {
        if title.trim().is_empty() || description.trim().is_empty() || location.trim().is_empty() {
            return Err(ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            });
        }
        Ok(())
    }
}

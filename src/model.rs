use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use derive_builder::Builder;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// A registered account.
///
/// The password is stored as an argon2 hash and is never serialized back out;
/// accounts are created on registration and mutated through profile updates
/// only.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct UserModel {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// Metadata record for an uploaded banner image.
///
/// The bytes live on disk under the uploads directory; the row is immutable
/// once created.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct FileModel {
    #[serde(default)]
    pub id: i64,
    /// Original filename as sent by the client.
    #[serde(default)]
    pub name: String,
    /// Storage filename, unique per upload.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// An event scheduled by an organizer.
///
/// # Invariants
/// - `date` is strictly in the future at creation time.
/// - Only the organizer may update or delete the row.
/// - A meetup whose date has passed can no longer be edited or cancelled.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct MeetupModel {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub banner_id: i64,
    #[serde(default)]
    pub organizer_id: i64,
}

/// Links a subscriber to a meetup they attend.
///
/// Junction row between users and meetups. `UNIQUE(subscriber_id, meetup_id)`
/// at the storage layer is the correctness guarantee against concurrent
/// duplicate subscriptions; the service pre-checks are the fast path.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct SubscriptionModel {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub subscriber_id: i64,
    #[serde(default)]
    pub meetup_id: i64,
}

/// Organizer summary embedded in listing responses.
#[derive(Serialize, Default, Clone, Debug)]
pub struct OrganizerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Banner summary embedded in listing responses.
#[derive(Serialize, Default, Clone, Debug)]
pub struct BannerSummary {
    pub id: i64,
    pub name: String,
    pub path: String,
}

/// Flat row produced by the meetup listing join (meetup + organizer + banner).
#[derive(FromRow)]
pub struct MeetupWithRelationsRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub banner_id: i64,
    pub organizer_id: i64,

    pub organizer_name: String,
    pub organizer_email: String,

    pub banner_name: String,
    pub banner_path: String,
}

/// Flat row produced by the subscription listing join
/// (subscription + meetup + organizer name + banner).
#[derive(FromRow)]
pub struct SubscriptionWithMeetupRow {
    pub id: i64,
    pub subscriber_id: i64,
    pub meetup_id: i64,

    pub title: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub organizer_id: i64,
    pub organizer_name: String,

    pub banner_id: i64,
    pub banner_name: String,
    pub banner_path: String,
}

/// Meetup enriched for API responses.
#[derive(Serialize, Clone, Debug)]
pub struct MeetupDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub organizer: OrganizerSummary,
    pub banner: BannerSummary,
}

impl From<MeetupWithRelationsRow> for MeetupDetail {
    fn from(row: MeetupWithRelationsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            date: row.date,
            organizer: OrganizerSummary {
                id: row.organizer_id,
                name: row.organizer_name,
                email: row.organizer_email,
            },
            banner: BannerSummary {
                id: row.banner_id,
                name: row.banner_name,
                path: row.banner_path,
            },
        }
    }
}

/// Subscription enriched for API responses.
#[derive(Serialize, Clone, Debug)]
pub struct SubscriptionDetail {
    pub id: i64,
    pub meetup_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub organizer_name: String,
    pub banner: BannerSummary,
}

impl From<SubscriptionWithMeetupRow> for SubscriptionDetail {
    fn from(row: SubscriptionWithMeetupRow) -> Self {
        Self {
            id: row.id,
            meetup_id: row.meetup_id,
            title: row.title,
            description: row.description,
            location: row.location,
            date: row.date,
            organizer_name: row.organizer_name,
            banner: BannerSummary {
                id: row.banner_id,
                name: row.banner_name,
                path: row.banner_path,
            },
        }
    }
}

/// Options for the meetup listing query.
#[derive(Builder, Clone)]
#[builder(pattern = "immutable")]
pub struct MeetupListOpt {
    /// Restrict results to meetups falling on this UTC calendar day.
    #[builder(default)]
    pub day: Option<NaiveDate>,
    /// 1-based page number.
    #[builder(default = "1")]
    pub page: u32,
    #[builder(default = "10")]
    pub per_page: u32,
}

/// Fields accepted by the partial meetup update.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct MeetupUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub banner_id: Option<i64>,
}

/// Fields accepted by the profile update.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
}

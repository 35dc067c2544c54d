use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use meetpoint::clock::Clock;
use meetpoint::mail::MailMessage;
use meetpoint::mail::MailTransport;
use meetpoint::model::FileModel;
use meetpoint::model::MeetupModel;
use meetpoint::model::UserModel;
use meetpoint::repository::Repository;
use meetpoint::repository::table::Table;
use uuid::Uuid;

pub async fn setup_db() -> (Arc<Repository>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("meetpoint-test-{}.db", uuid));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Repository::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

pub async fn teardown_db(db_path: PathBuf) {
    if db_path.exists() {
        let _ = std::fs::remove_file(db_path);
    }
}

/// Polls until `pred` holds, failing the test after ~2 seconds.
#[allow(dead_code)]
pub async fn wait_until(what: &str, pred: impl Fn() -> bool) {
    for _ in 0..200 {
        if pred() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Timed out waiting for {what}");
}

// MOCK CLOCK

/// Settable clock so the date-window rules can be driven through time.
#[allow(dead_code)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

#[allow(dead_code)]
impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: RwLock::new(now),
        })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }
}

// MOCK MAIL TRANSPORT

/// Transport that records every message, optionally failing each send.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingMailTransport {
    pub sent: RwLock<Vec<MailMessage>>,
    pub fail: RwLock<bool>,
}

#[allow(dead_code)]
impl RecordingMailTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.write().unwrap() = fail;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        if *self.fail.read().unwrap() {
            return Err(anyhow::anyhow!("transport down"));
        }
        self.sent.write().unwrap().push(message);
        Ok(())
    }
}

// DATA FIXTURES

#[allow(dead_code)]
pub async fn create_user(db: &Repository, name: &str, email: &str) -> UserModel {
    let mut user = UserModel {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        created_at: Utc::now(),
        ..Default::default()
    };
    user.id = db
        .user_table
        .insert(&user)
        .await
        .expect("Failed to insert user");
    user
}

#[allow(dead_code)]
pub async fn create_file(db: &Repository, name: &str) -> FileModel {
    let mut file = FileModel {
        name: name.to_string(),
        path: format!("{}-{}", Uuid::new_v4(), name),
        created_at: Utc::now(),
        ..Default::default()
    };
    file.id = db
        .file_table
        .insert(&file)
        .await
        .expect("Failed to insert file");
    file
}

#[allow(dead_code)]
pub async fn create_meetup(
    db: &Repository,
    organizer_id: i64,
    banner_id: i64,
    title: &str,
    date: DateTime<Utc>,
) -> MeetupModel {
    let mut meetup = MeetupModel {
        title: title.to_string(),
        description: "A meetup".to_string(),
        location: "Av. Paulista, 1000".to_string(),
        date,
        banner_id,
        organizer_id,
        ..Default::default()
    };
    meetup.id = db
        .meetup_table
        .insert(&meetup)
        .await
        .expect("Failed to insert meetup");
    meetup
}

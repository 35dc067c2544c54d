//! Database table operations and implementations.

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteArguments;

use crate::model::FileModel;
use crate::model::MeetupListOpt;
use crate::model::MeetupModel;
use crate::model::MeetupWithRelationsRow;
use crate::model::SubscriptionModel;
use crate::model::SubscriptionWithMeetupRow;
use crate::model::UserModel;
use crate::repository::error::DatabaseError;

/// Base table struct providing database pool access.
#[derive(Clone)]
pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    /// Creates a new base table with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Base trait for table operations.
#[async_trait::async_trait]
pub trait TableBase {
    /// Creates the table if it doesn't exist.
    async fn create_table(&self) -> Result<(), DatabaseError>;
    /// Drops the table.
    async fn drop_table(&self) -> Result<(), DatabaseError>;
    /// Deletes all rows from the table.
    async fn delete_all(&self) -> Result<(), DatabaseError>;
}

/// Trait for tables with CRUD operations.
#[async_trait::async_trait]
pub trait Table<T, ID>: TableBase {
    async fn select_all(&self) -> Result<Vec<T>, DatabaseError>;
    async fn insert(&self, model: &T) -> Result<ID, DatabaseError>;
    async fn select(&self, id: &ID) -> Result<Option<T>, DatabaseError>;
    async fn update(&self, model: &T) -> Result<(), DatabaseError>;
    async fn delete(&self, id: &ID) -> Result<(), DatabaseError>;
}

/// Helper trait to handle binding typed parameters through the table macro.
pub trait BindParam<'q> {
    fn bind_param<O>(
        self,
        query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>;
    fn bind_param_q(
        self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>;
}

macro_rules! impl_bind_param {
    ($t:ty) => {
        impl<'q> BindParam<'q> for $t {
            fn bind_param<O>(
                self,
                query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>,
            ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>> {
                query.bind(self)
            }
            fn bind_param_q(
                self,
                query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
            ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
                query.bind(self)
            }
        }
    };
}

// Implement for reference types that are passed to .bind()
impl_bind_param!(&'q i64);
impl_bind_param!(&'q String);
impl_bind_param!(&'q Option<String>);
impl_bind_param!(&'q chrono::DateTime<chrono::Utc>);

macro_rules! impl_table {
    (
        $struct_name:ident,
        $model:ty,
        $table:expr,
        $pk:ident,
        $id_type:ty,
        $create_sql:expr,
        $cols:expr,
        $vals:expr,
        $update_set:expr,
        [ $( $field:ident ),+ ]
    ) => {
        #[derive(Clone)]
        pub struct $struct_name {
            base: BaseTable,
        }

        impl $struct_name {
            pub fn new(pool: SqlitePool) -> Self {
                Self {
                    base: BaseTable::new(pool),
                }
            }
        }

        #[async_trait::async_trait]
        impl TableBase for $struct_name {
            async fn create_table(&self) -> Result<(), DatabaseError> {
                sqlx::query($create_sql)
                    .execute(&self.base.pool)
                    .await?;
                Ok(())
            }

            async fn drop_table(&self) -> Result<(), DatabaseError> {
                sqlx::query(concat!("DROP TABLE IF EXISTS ", $table))
                    .execute(&self.base.pool)
                    .await?;
                Ok(())
            }

            async fn delete_all(&self) -> Result<(), DatabaseError> {
                sqlx::query(concat!("DELETE FROM ", $table))
                    .execute(&self.base.pool)
                    .await?;
                Ok(())
            }
        }

        #[async_trait::async_trait]
        impl Table<$model, $id_type> for $struct_name {
            async fn select_all(&self) -> Result<Vec<$model>, DatabaseError> {
                Ok(sqlx::query_as::<_, $model>(concat!("SELECT * FROM ", $table))
                    .fetch_all(&self.base.pool)
                    .await?)
            }

            async fn select(&self, id: &$id_type) -> Result<Option<$model>, DatabaseError> {
                let query = sqlx::query_as::<_, $model>(concat!("SELECT * FROM ", $table, " WHERE ", stringify!($pk), " = ?"));
                let query = BindParam::bind_param(id, query);
                Ok(
                    query
                        .fetch_optional(&self.base.pool)
                        .await?,
                )
            }

            async fn insert(&self, model: &$model) -> Result<$id_type, DatabaseError> {
                let mut query = sqlx::query_as(concat!(
                        "INSERT INTO ", $table, " (", $cols, ") VALUES (", $vals, ") RETURNING ", stringify!($pk)
                    ));

                $(
                    query = BindParam::bind_param(&model.$field, query);
                )+

                let row: ($id_type,) = query.fetch_one(&self.base.pool).await?;
                Ok(row.0)
            }

            async fn update(&self, model: &$model) -> Result<(), DatabaseError> {
                let mut query = sqlx::query(concat!(
                        "UPDATE ", $table, " SET ", $update_set, " WHERE ", stringify!($pk), " = ?"
                    ));

                $(
                    query = BindParam::bind_param_q(&model.$field, query);
                )+
                query = BindParam::bind_param_q(&model.$pk, query);

                query.execute(&self.base.pool).await?;
                Ok(())
            }

            async fn delete(&self, id: &$id_type) -> Result<(), DatabaseError> {
                let query = sqlx::query(concat!("DELETE FROM ", $table, " WHERE ", stringify!($pk), " = ?"));
                let query = BindParam::bind_param_q(id, query);
                query.execute(&self.base.pool).await?;
                Ok(())
            }
        }
    };
}

// ============================================================================
// UserTable
// ============================================================================

impl_table!(
    UserTable,
    UserModel,
    "users",
    id,
    i64,
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL,
        UNIQUE(email)
    )"#,
    "name, email, password_hash, created_at",
    "?, ?, ?, ?",
    "name = ?, email = ?, password_hash = ?, created_at = ?",
    [name, email, password_hash, created_at]
);

impl UserTable {
    pub async fn select_by_email(&self, email: &str) -> Result<Option<UserModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE email = ? LIMIT 1")
                .bind(email)
                .fetch_optional(&self.base.pool)
                .await?,
        )
    }
}

// ============================================================================
// FileTable
// ============================================================================

impl_table!(
    FileTable,
    FileModel,
    "files",
    id,
    i64,
    r#"CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        path TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL,
        UNIQUE(path)
    )"#,
    "name, path, created_at",
    "?, ?, ?",
    "name = ?, path = ?, created_at = ?",
    [name, path, created_at]
);

// ============================================================================
// MeetupTable
// ============================================================================

impl_table!(
    MeetupTable,
    MeetupModel,
    "meetups",
    id,
    i64,
    r#"CREATE TABLE IF NOT EXISTS meetups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        location TEXT NOT NULL,
        date TIMESTAMP NOT NULL,
        banner_id INTEGER NOT NULL,
        organizer_id INTEGER NOT NULL,
        FOREIGN KEY (banner_id) REFERENCES files(id),
        FOREIGN KEY (organizer_id) REFERENCES users(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE
    )"#,
    "title, description, location, date, banner_id, organizer_id",
    "?, ?, ?, ?, ?, ?",
    "title = ?, description = ?, location = ?, date = ?, banner_id = ?, organizer_id = ?",
    [title, description, location, date, banner_id, organizer_id]
);

const MEETUP_LISTING_SELECT: &str = r#"
    SELECT
        m.id, m.title, m.description, m.location, m.date, m.banner_id, m.organizer_id,
        u.name as organizer_name, u.email as organizer_email,
        f.name as banner_name, f.path as banner_path
    FROM meetups m
    JOIN users u ON u.id = m.organizer_id
    JOIN files f ON f.id = m.banner_id
"#;

impl MeetupTable {
    /// Paginated listing joined with organizer and banner, ordered by date
    /// ascending. Filters to a UTC day window when `opts.day` is set.
    ///
    /// # Arguments
    /// * `opts.page` - n-th page to show. Starts at 1.
    pub async fn select_paginated(
        &self,
        opts: &MeetupListOpt,
    ) -> Result<Vec<MeetupWithRelationsRow>, DatabaseError> {
        let page = opts.page.max(1) - 1;
        let limit = opts.per_page as i64;
        let offset = (opts.per_page * page) as i64;

        let mut query = String::from(MEETUP_LISTING_SELECT);

        let day_range = opts.day.map(Self::day_range);
        if day_range.is_some() {
            query.push_str(" WHERE m.date >= ? AND m.date < ?");
        }
        query.push_str(" ORDER BY m.date ASC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, MeetupWithRelationsRow>(&query);
        if let Some((start, end)) = day_range {
            q = q.bind(start).bind(end);
        }
        q = q.bind(limit).bind(offset);

        Ok(q.fetch_all(&self.base.pool).await?)
    }

    /// Total row count for the listing filter, used for the pagination header.
    pub async fn count(&self, opts: &MeetupListOpt) -> Result<i64, DatabaseError> {
        let mut query = String::from("SELECT COUNT(*) FROM meetups");

        let day_range = opts.day.map(Self::day_range);
        if day_range.is_some() {
            query.push_str(" WHERE date >= ? AND date < ?");
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        if let Some((start, end)) = day_range {
            q = q.bind(start).bind(end);
        }

        Ok(q.fetch_one(&self.base.pool).await?.0)
    }

    /// Meetups organized by the given user, banner joined, date ascending.
    ///
    /// # Arguments
    /// * `page` - n-th page to show. Starts at 0.
    pub async fn select_paginated_by_organizer_id(
        &self,
        organizer_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MeetupWithRelationsRow>, DatabaseError> {
        let limit = per_page as i64;
        let offset = (per_page * page) as i64;

        let query = format!(
            "{MEETUP_LISTING_SELECT} WHERE m.organizer_id = ? ORDER BY m.date ASC LIMIT ? OFFSET ?"
        );

        Ok(sqlx::query_as::<_, MeetupWithRelationsRow>(&query)
            .bind(organizer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.base.pool)
            .await?)
    }

    pub async fn count_by_organizer_id(&self, organizer_id: i64) -> Result<i64, DatabaseError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM meetups WHERE organizer_id = ?")
                .bind(organizer_id)
                .fetch_one(&self.base.pool)
                .await?;
        Ok(count.0)
    }

    /// Half-open UTC day window `[00:00, next day 00:00)` for the day filter.
    fn day_range(
        day: chrono::NaiveDate,
    ) -> (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) {
        let start = day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let end = start + chrono::Duration::days(1);
        (start, end)
    }
}

// ============================================================================
// SubscriptionTable
// ============================================================================

impl_table!(
    SubscriptionTable,
    SubscriptionModel,
    "subscriptions",
    id,
    i64,
    r#"CREATE TABLE IF NOT EXISTS subscriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        subscriber_id INTEGER NOT NULL,
        meetup_id INTEGER NOT NULL,
        UNIQUE(subscriber_id, meetup_id),
        FOREIGN KEY (subscriber_id) REFERENCES users(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE,
        FOREIGN KEY (meetup_id) REFERENCES meetups(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE
    )"#,
    "subscriber_id, meetup_id",
    "?, ?",
    "subscriber_id = ?, meetup_id = ?",
    [subscriber_id, meetup_id]
);

impl SubscriptionTable {
    /// Looks up the subscription for a (subscriber, meetup) pair.
    pub async fn select_by_subscriber_and_meetup(
        &self,
        subscriber_id: i64,
        meetup_id: i64,
    ) -> Result<Option<SubscriptionModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, SubscriptionModel>(
            "SELECT * FROM subscriptions WHERE subscriber_id = ? AND meetup_id = ? LIMIT 1",
        )
        .bind(subscriber_id)
        .bind(meetup_id)
        .fetch_optional(&self.base.pool)
        .await?)
    }

    /// True when the subscriber already holds a subscription to any meetup
    /// scheduled at exactly the given timestamp.
    pub async fn exists_by_subscriber_and_date(
        &self,
        subscriber_id: i64,
        date: &chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, DatabaseError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM subscriptions s
            JOIN meetups m ON m.id = s.meetup_id
            WHERE s.subscriber_id = ? AND m.date = ?
            "#,
        )
        .bind(subscriber_id)
        .bind(date)
        .fetch_one(&self.base.pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// Paginated upcoming subscriptions for a subscriber, joined with meetup,
    /// organizer name, and banner, ordered by meetup date ascending.
    ///
    /// # Arguments
    /// * `page` - n-th page to show. Starts at 0.
    pub async fn select_paginated_upcoming_by_subscriber_id(
        &self,
        subscriber_id: i64,
        now: &chrono::DateTime<chrono::Utc>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SubscriptionWithMeetupRow>, DatabaseError> {
        let limit = per_page as i64;
        let offset = (per_page * page) as i64;

        Ok(sqlx::query_as::<_, SubscriptionWithMeetupRow>(
            r#"
            SELECT
                s.id, s.subscriber_id, s.meetup_id,
                m.title, m.description, m.location, m.date, m.organizer_id,
                u.name as organizer_name,
                m.banner_id, f.name as banner_name, f.path as banner_path
            FROM subscriptions s
            JOIN meetups m ON m.id = s.meetup_id
            JOIN users u ON u.id = m.organizer_id
            JOIN files f ON f.id = m.banner_id
            WHERE s.subscriber_id = ? AND m.date > ?
            ORDER BY m.date ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(subscriber_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.base.pool)
        .await?)
    }

    /// Count of upcoming subscriptions, used for the pagination header.
    pub async fn count_upcoming_by_subscriber_id(
        &self,
        subscriber_id: i64,
        now: &chrono::DateTime<chrono::Utc>,
    ) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM subscriptions s
            JOIN meetups m ON m.id = s.meetup_id
            WHERE s.subscriber_id = ? AND m.date > ?
            "#,
        )
        .bind(subscriber_id)
        .bind(now)
        .fetch_one(&self.base.pool)
        .await?;
        Ok(count.0)
    }
}

//! Relational storage on SQLite through SQLx.

use std::str::FromStr;

use log::debug;
use log::info;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::repository::table::FileTable;
use crate::repository::table::MeetupTable;
use crate::repository::table::SubscriptionTable;
use crate::repository::table::TableBase;
use crate::repository::table::UserTable;

pub mod error;
pub mod table;

/// Main database struct containing all table handlers.
pub struct Repository {
    pool: SqlitePool,
    pub user_table: UserTable,
    pub file_table: FileTable,
    pub meetup_table: MeetupTable,
    pub subscription_table: SubscriptionTable,
}

impl Repository {
    /// Creates a new database connection and initializes table handlers.
    pub async fn new(db_url: &str, db_path: &str) -> anyhow::Result<Self> {
        let path = std::path::Path::new(db_path);
        if !path.exists() {
            debug!("Database path {db_path} does not exist. Creating...");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "")?;
            info!("Created {db_path}");
        }

        debug!("Connecting to db...");
        let opts = SqliteConnectOptions::from_str(db_url)?.foreign_keys(true);
        let pool = SqlitePool::connect_with(opts).await?;
        info!("Connected to db.");

        let user_table = UserTable::new(pool.clone());
        let file_table = FileTable::new(pool.clone());
        let meetup_table = MeetupTable::new(pool.clone());
        let subscription_table = SubscriptionTable::new(pool.clone());

        Ok(Self {
            pool,
            user_table,
            file_table,
            meetup_table,
            subscription_table,
        })
    }

    /// Runs database migrations from the migrations directory.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Drops all tables. Use with caution!
    pub async fn drop_all_tables(&self) -> anyhow::Result<()> {
        self.subscription_table.drop_table().await?;
        self.meetup_table.drop_table().await?;
        self.file_table.drop_table().await?;
        self.user_table.drop_table().await?;
        Ok(())
    }

    /// Deletes all data from all tables. Use with caution!
    pub async fn delete_all_tables(&self) -> anyhow::Result<()> {
        self.subscription_table.delete_all().await?;
        self.meetup_table.delete_all().await?;
        self.file_table.delete_all().await?;
        self.user_table.delete_all().await?;
        Ok(())
    }
}

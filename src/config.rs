use std::path::PathBuf;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub http_addr: String,
    pub db_url: String,
    pub db_path: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub uploads_path: PathBuf,
    pub logs_path: PathBuf,
    pub page_size: u32,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            http_addr: std::env::var("HTTP_ADDR").unwrap_or("0.0.0.0:3333".to_string()),
            db_url: std::env::var("DB_URL").unwrap_or("sqlite://data.db".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or("data.db".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").map_err(|_| AppError::MissingConfig {
                key: "JWT_SECRET".to_string(),
            })?,
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .unwrap_or("604800".to_string())
                .parse::<i64>()
                .unwrap_or(604_800),
            uploads_path: std::env::var("UPLOADS_PATH")
                .unwrap_or("tmp/uploads".to_string())
                .into(),
            logs_path: std::env::var("LOGS_PATH").unwrap_or("logs".to_string()).into(),
            page_size: std::env::var("PAGE_SIZE")
                .unwrap_or("10".to_string())
                .parse::<u32>()
                .unwrap_or(10),
        })
    }
}

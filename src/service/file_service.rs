//! Banner upload storage: bytes to disk, metadata to the files table.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::locale::MessageKey;
use crate::model::FileModel;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Service for storing uploaded banner images.
pub struct FileService {
    pub db: Arc<Repository>,
    pub clock: Arc<dyn Clock>,
    uploads_path: PathBuf,
}

impl FileService {
    pub fn new(db: Arc<Repository>, clock: Arc<dyn Clock>, uploads_path: PathBuf) -> Self {
        Self {
            db,
            clock,
            uploads_path,
        }
    }

    /// Writes the upload to the uploads directory under a collision-free name
    /// and records its metadata.
    ///
    /// # Performance
    /// * DB calls: 1
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<FileModel, ServiceError> {
        if original_name.trim().is_empty() || bytes.is_empty() {
            return Err(ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            });
        }

        let storage_name = Self::storage_name(original_name);
        let target = self.uploads_path.join(&storage_name);

        tokio::fs::create_dir_all(&self.uploads_path)
            .await
            .map_err(|e| ServiceError::UnexpectedResult {
                message: format!("Failed to create uploads dir: {e}"),
            })?;
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| ServiceError::UnexpectedResult {
                message: format!("Failed to write upload: {e}"),
            })?;
        debug!("Stored upload {original_name} as {storage_name}");

        let mut file = FileModel {
            id: 0,
            name: original_name.to_string(),
            path: storage_name,
            created_at: self.clock.now(),
        };
        // DB 1
        file.id = self.db.file_table.insert(&file).await?;

        Ok(file)
    }

    /// Unique storage filename keeping the original extension.
    fn storage_name(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        format!("{}{}", Uuid::new_v4(), ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_name_keeps_extension() {
        let name = FileService::storage_name("banner.png");
        assert!(name.ends_with(".png"));
        assert_ne!(name, "banner.png");
    }

    #[test]
    fn storage_name_without_extension() {
        let name = FileService::storage_name("banner");
        assert!(!name.contains('.'));
        assert!(!name.is_empty());
    }

    #[test]
    fn storage_names_are_unique() {
        assert_ne!(
            FileService::storage_name("a.jpg"),
            FileService::storage_name("a.jpg")
        );
    }
}

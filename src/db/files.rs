//! File attachment metadata queries.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::incident_file::{self, ActiveModel, Entity as IncidentFile};
use crate::error::{AppError, AppResult};
use crate::models::FileAttachment;
use crate::store::FileRepository;

use super::{DbPool, decode_count, encode_count, insert_error};

fn model_to_file(m: incident_file::Model) -> AppResult<FileAttachment> {
    Ok(FileAttachment {
        file_size: decode_count(m.file_size, "file_size", m.id)?,
        id: m.id,
        incident_id: m.incident_id,
        filename: m.filename,
        original_name: m.original_name,
        file_type: m.file_type,
        upload_date: m.upload_date,
    })
}

#[async_trait]
impl FileRepository for DbPool {
    async fn insert_file(&self, record: &FileAttachment) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(record.id),
            incident_id: Set(record.incident_id),
            filename: Set(record.filename.clone()),
            original_name: Set(record.original_name.clone()),
            file_type: Set(record.file_type.clone()),
            file_size: Set(encode_count(record.file_size)?),
            upload_date: Set(record.upload_date),
        };

        model.insert(self.connection()).await.map_err(|e| {
            insert_error(
                e,
                "file",
                &format!("Stored name {} already in use", record.filename),
            )
        })?;

        Ok(())
    }

    async fn find_file(&self, id: Uuid) -> AppResult<Option<FileAttachment>> {
        IncidentFile::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get file: {}", e)))?
            .map(model_to_file)
            .transpose()
    }

    async fn list_files(&self, incident_id: Uuid) -> AppResult<Vec<FileAttachment>> {
        IncidentFile::find()
            .filter(incident_file::Column::IncidentId.eq(incident_id))
            .order_by_desc(incident_file::Column::UploadDate)
            .order_by_desc(incident_file::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list files: {}", e)))?
            .into_iter()
            .map(model_to_file)
            .collect()
    }

    async fn count_files(&self, incident_id: Uuid) -> AppResult<u64> {
        IncidentFile::find()
            .filter(incident_file::Column::IncidentId.eq(incident_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count files: {}", e)))
    }

    async fn delete_file(&self, id: Uuid) -> AppResult<bool> {
        let result = IncidentFile::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete file: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}

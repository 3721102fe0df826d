//! Comment queries.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::comment::{self, ActiveModel, Entity as CommentEntity};
use crate::error::{AppError, AppResult};
use crate::models::Comment;
use crate::store::CommentRepository;

use super::{DbPool, insert_error};

fn model_to_comment(m: comment::Model) -> Comment {
    Comment {
        id: m.id,
        incident_id: m.incident_id,
        user_id: m.user_id,
        username: m.username,
        message: m.message,
        is_admin: m.is_admin,
        created_at: m.created_at,
    }
}

#[async_trait]
impl CommentRepository for DbPool {
    async fn insert_comment(&self, record: &Comment) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(record.id),
            incident_id: Set(record.incident_id),
            user_id: Set(record.user_id),
            username: Set(record.username.clone()),
            message: Set(record.message.clone()),
            is_admin: Set(record.is_admin),
            created_at: Set(record.created_at),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| insert_error(e, "comment", "Comment already exists"))?;

        Ok(())
    }

    async fn list_comments(&self, incident_id: Uuid) -> AppResult<Vec<Comment>> {
        let rows = CommentEntity::find()
            .filter(comment::Column::IncidentId.eq(incident_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list comments: {}", e)))?;

        Ok(rows.into_iter().map(model_to_comment).collect())
    }

    async fn count_comments(&self, incident_id: Uuid) -> AppResult<u64> {
        CommentEntity::find()
            .filter(comment::Column::IncidentId.eq(incident_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count comments: {}", e)))
    }

    async fn delete_comments_for_incident(&self, incident_id: Uuid) -> AppResult<u64> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::IncidentId.eq(incident_id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete comments: {}", e)))?;

        Ok(result.rows_affected)
    }
}

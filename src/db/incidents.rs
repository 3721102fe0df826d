//! Incident queries.
//!
//! Partial updates go through `update_many` with only the touched columns
//! so concurrent writers never overwrite each other's fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::incident::{self, ActiveModel, Entity as IncidentEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Incident, IncidentPatch, IncidentStatus, Severity};
use crate::store::IncidentRepository;

use super::{DbPool, decode_count, encode_count, insert_error};

fn model_to_incident(m: incident::Model) -> AppResult<Incident> {
    let severity = Severity::parse(&m.severity).ok_or_else(|| {
        AppError::CorruptState(format!("Unknown severity '{}' on incident {}", m.severity, m.id))
    })?;
    let status = IncidentStatus::parse(&m.status).ok_or_else(|| {
        AppError::CorruptState(format!("Unknown status '{}' on incident {}", m.status, m.id))
    })?;

    Ok(Incident {
        id: m.id,
        title: m.title,
        description: m.description,
        category: m.category,
        location: m.location,
        people_involved: m.people_involved,
        severity,
        status,
        created_by: m.created_by,
        created_by_username: m.created_by_username,
        created_at: m.created_at,
        updated_at: m.updated_at,
        comments_count: decode_count(m.comments_count, "comments_count", m.id)?,
        files_count: decode_count(m.files_count, "files_count", m.id)?,
    })
}

impl DbPool {
    async fn update_incident(
        &self,
        id: Uuid,
        update: sea_orm::UpdateMany<IncidentEntity>,
        what: &str,
    ) -> AppResult<bool> {
        let result = update
            .filter(incident::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update incident {}: {}", what, e)))?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl IncidentRepository for DbPool {
    async fn insert_incident(&self, record: &Incident) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(record.id),
            title: Set(record.title.clone()),
            description: Set(record.description.clone()),
            category: Set(record.category.clone()),
            location: Set(record.location.clone()),
            people_involved: Set(record.people_involved.clone()),
            severity: Set(record.severity.as_str().to_string()),
            status: Set(record.status.as_str().to_string()),
            created_by: Set(record.created_by),
            created_by_username: Set(record.created_by_username.clone()),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
            comments_count: Set(encode_count(record.comments_count)?),
            files_count: Set(encode_count(record.files_count)?),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| insert_error(e, "incident", "Incident already exists"))?;

        Ok(())
    }

    async fn find_incident(&self, id: Uuid) -> AppResult<Option<Incident>> {
        IncidentEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get incident: {}", e)))?
            .map(model_to_incident)
            .transpose()
    }

    async fn list_incidents(&self, owner: Option<Uuid>) -> AppResult<Vec<Incident>> {
        let mut query = IncidentEntity::find();
        if let Some(owner) = owner {
            query = query.filter(incident::Column::CreatedBy.eq(owner));
        }

        query
            .order_by_desc(incident::Column::CreatedAt)
            .order_by_desc(incident::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list incidents: {}", e)))?
            .into_iter()
            .map(model_to_incident)
            .collect()
    }

    async fn update_incident_fields(
        &self,
        id: Uuid,
        patch: &IncidentPatch,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Incident>> {
        let mut update = IncidentEntity::update_many()
            .col_expr(incident::Column::UpdatedAt, Expr::value(updated_at));

        if let Some(ref v) = patch.title {
            update = update.col_expr(incident::Column::Title, Expr::value(v.clone()));
        }
        if let Some(ref v) = patch.description {
            update = update.col_expr(incident::Column::Description, Expr::value(v.clone()));
        }
        if let Some(ref v) = patch.category {
            update = update.col_expr(incident::Column::Category, Expr::value(v.clone()));
        }
        if let Some(ref v) = patch.location {
            update = update.col_expr(incident::Column::Location, Expr::value(v.clone()));
        }
        if let Some(ref v) = patch.people_involved {
            update = update.col_expr(incident::Column::PeopleInvolved, Expr::value(v.clone()));
        }
        if let Some(v) = patch.severity {
            update = update.col_expr(incident::Column::Severity, Expr::value(v.as_str()));
        }

        if !self.update_incident(id, update, "fields").await? {
            return Ok(None);
        }

        self.find_incident(id).await
    }

    async fn set_incident_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let update = IncidentEntity::update_many()
            .col_expr(incident::Column::Status, Expr::value(status.as_str()))
            .col_expr(incident::Column::UpdatedAt, Expr::value(updated_at));

        self.update_incident(id, update, "status").await
    }

    async fn set_comments_count(
        &self,
        id: Uuid,
        count: u64,
        updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let mut update = IncidentEntity::update_many()
            .col_expr(incident::Column::CommentsCount, Expr::value(encode_count(count)?));
        if let Some(ts) = updated_at {
            update = update.col_expr(incident::Column::UpdatedAt, Expr::value(ts));
        }

        self.update_incident(id, update, "comments_count").await
    }

    async fn set_files_count(
        &self,
        id: Uuid,
        count: u64,
        updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let mut update = IncidentEntity::update_many()
            .col_expr(incident::Column::FilesCount, Expr::value(encode_count(count)?));
        if let Some(ts) = updated_at {
            update = update.col_expr(incident::Column::UpdatedAt, Expr::value(ts));
        }

        self.update_incident(id, update, "files_count").await
    }

    async fn delete_incident(&self, id: Uuid) -> AppResult<bool> {
        let result = IncidentEntity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete incident: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}

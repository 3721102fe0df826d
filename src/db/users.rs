//! User account queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as User};
use crate::error::{AppError, AppResult};
use crate::models::{Role, UserRecord};
use crate::store::UserRepository;

use super::{DbPool, insert_error};

fn model_to_record(m: user::Model) -> AppResult<UserRecord> {
    let role = Role::parse(&m.role).ok_or_else(|| {
        AppError::CorruptState(format!("Unknown role '{}' on user {}", m.role, m.id))
    })?;

    Ok(UserRecord {
        id: m.id,
        username: m.username,
        email: m.email,
        password_hash: m.password_hash,
        role,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[async_trait]
impl UserRepository for DbPool {
    async fn insert_user(&self, record: &UserRecord) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(record.id),
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            password_hash: Set(record.password_hash.clone()),
            role: Set(record.role.as_str().to_string()),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        };

        model.insert(self.connection()).await.map_err(|e| {
            insert_error(e, "user", "Username or email already registered")
        })?;

        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?
            .map(model_to_record)
            .transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        User::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?
            .map(model_to_record)
            .transpose()
    }

    async fn username_or_email_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check user existence: {}", e)))?;

        Ok(count > 0)
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = User::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(updated_at))
            .filter(user::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update password: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}

//! Migration: Create comments table.
//!
//! No foreign key to incidents: children are purged by the service after
//! the parent record is gone.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE comments (
                    id UUID PRIMARY KEY,
                    incident_id UUID NOT NULL,
                    user_id UUID NOT NULL,
                    username VARCHAR(100) NOT NULL,
                    message TEXT NOT NULL,
                    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL
                );

                CREATE INDEX idx_comments_incident_id ON comments(incident_id, created_at);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS comments CASCADE;")
            .await?;

        Ok(())
    }
}

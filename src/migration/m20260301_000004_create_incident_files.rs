//! Migration: Create incident_files table.

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
                CREATE TABLE incident_files (
                    id UUID PRIMARY KEY,
                    incident_id UUID NOT NULL,
                    filename VARCHAR(600) NOT NULL,
                    original_name VARCHAR(500) NOT NULL,
                    file_type VARCHAR(10) NOT NULL
                        CHECK (file_type IN ('.jpg', '.jpeg', '.png', '.pdf')),
                    file_size BIGINT NOT NULL CHECK (file_size >= 0),
                    upload_date TIMESTAMPTZ NOT NULL
                );

                -- Stored names are globally unique blob keys
                CREATE UNIQUE INDEX idx_incident_files_filename ON incident_files(filename);
                CREATE INDEX idx_incident_files_incident_id ON incident_files(incident_id, upload_date DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS incident_files CASCADE;")
            .await?;

        Ok(())
    }
}

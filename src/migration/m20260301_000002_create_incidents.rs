//! Migration: Create incidents table.

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
                CREATE TABLE incidents (
                    id UUID PRIMARY KEY,
                    title VARCHAR(500) NOT NULL,
                    description TEXT NOT NULL,
                    category VARCHAR(255) NOT NULL,
                    location VARCHAR(255) NOT NULL,
                    people_involved VARCHAR(255) NOT NULL,
                    severity VARCHAR(20) NOT NULL
                        CHECK (severity IN ('baixa', 'media', 'alta')),
                    status VARCHAR(20) NOT NULL DEFAULT 'nova'
                        CHECK (status IN ('nova', 'em_andamento', 'resolvida', 'cancelada')),
                    created_by UUID NOT NULL,
                    created_by_username VARCHAR(100) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL,
                    comments_count BIGINT NOT NULL DEFAULT 0 CHECK (comments_count >= 0),
                    files_count BIGINT NOT NULL DEFAULT 0 CHECK (files_count >= 0)
                );

                -- Owner-scoped listing, newest first
                CREATE INDEX idx_incidents_created_by ON incidents(created_by, created_at DESC);
                CREATE INDEX idx_incidents_created_at ON incidents(created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS incidents CASCADE;")
            .await?;

        Ok(())
    }
}

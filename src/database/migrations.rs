//! Schema de la base de datos
//!
//! Sentencias DDL idempotentes que se ejecutan en cada arranque, más la
//! siembra de las dos listas por defecto.

use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::models::{ListType, DEFAULT_BLACKLIST, DEFAULT_WHITELIST};

#[derive(Debug, Error)]
#[error("migration {step} failed: {source}")]
pub struct MigrationError {
    pub step: usize,
    #[source]
    pub source: sqlx::Error,
}

pub const MIGRATION_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS plates (
        id              BIGSERIAL PRIMARY KEY,
        number          TEXT NOT NULL,
        normalized      TEXT NOT NULL,
        country         TEXT,
        region          TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS ux_plates_normalized ON plates(normalized)"#,
    r#"CREATE TABLE IF NOT EXISTS vehicles (
        id              BIGSERIAL PRIMARY KEY,
        plate_id        BIGINT REFERENCES plates(id),
        make            TEXT,
        model           TEXT,
        color           TEXT,
        body_type       TEXT,
        notes           TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS anpr_events (
        id               BIGSERIAL PRIMARY KEY,
        plate_id         BIGINT REFERENCES plates(id),
        camera_id        TEXT NOT NULL,
        camera_model     TEXT,
        direction        TEXT,
        lane             INT,
        raw_plate        TEXT NOT NULL,
        normalized_plate TEXT NOT NULL,
        confidence       NUMERIC(5,2),
        vehicle_color    TEXT,
        vehicle_type     TEXT,
        snapshot_url     TEXT,
        event_time       TIMESTAMPTZ NOT NULL,
        raw_payload      JSONB,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_anpr_events_plate_id ON anpr_events(plate_id)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_anpr_events_event_time ON anpr_events(event_time)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_anpr_events_normalized_plate ON anpr_events(normalized_plate)"#,
    r#"CREATE TABLE IF NOT EXISTS lists (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        type        TEXT NOT NULL,
        description TEXT,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS ux_lists_name ON lists(name)"#,
    r#"CREATE TABLE IF NOT EXISTS list_items (
        list_id     BIGINT REFERENCES lists(id),
        plate_id    BIGINT REFERENCES plates(id),
        note        TEXT,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (list_id, plate_id)
    )"#,
];

/// Listas que deben existir siempre
pub const DEFAULT_LISTS: &[(&str, ListType, &str)] = &[
    (DEFAULT_WHITELIST, ListType::Whitelist, "Default whitelist"),
    (DEFAULT_BLACKLIST, ListType::Blacklist, "Default blacklist"),
];

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    for (i, stmt) in MIGRATION_STATEMENTS.iter().enumerate() {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|source| MigrationError { step: i + 1, source })?;
        debug!(step = i + 1, "migration applied");
    }

    let seed_step = MIGRATION_STATEMENTS.len() + 1;
    for (name, list_type, description) in DEFAULT_LISTS {
        sqlx::query(
            "INSERT INTO lists (name, type, description) VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING",
        )
        .bind(*name)
        .bind(list_type.as_str())
        .bind(*description)
        .execute(pool)
        .await
        .map_err(|source| MigrationError { step: seed_step, source })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_statements_are_idempotent() {
        for stmt in MIGRATION_STATEMENTS {
            assert!(stmt.contains("IF NOT EXISTS"), "not idempotent: {}", stmt);
        }
    }

    #[test]
    fn test_creates_the_five_tables() {
        let tables: Vec<&str> = MIGRATION_STATEMENTS
            .iter()
            .filter_map(|s| s.strip_prefix("CREATE TABLE IF NOT EXISTS "))
            .filter_map(|rest| rest.split_whitespace().next())
            .collect();
        assert_eq!(tables, vec!["plates", "vehicles", "anpr_events", "lists", "list_items"]);
    }

    #[test]
    fn test_default_lists_cover_both_types() {
        assert_eq!(DEFAULT_LISTS.len(), 2);
        assert!(DEFAULT_LISTS.iter().any(|(_, t, _)| *t == ListType::Whitelist));
        assert!(DEFAULT_LISTS.iter().any(|(_, t, _)| *t == ListType::Blacklist));
    }
}

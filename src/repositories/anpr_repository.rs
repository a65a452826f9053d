//! Repositorio PostgreSQL de matrículas, eventos y listas

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{AnprEvent, EventFilter, ListHit, NewAnprEvent, Plate};
use crate::repositories::AnprStore;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::retention_cutoff;

const EVENT_COLUMNS: &str = r#"
    id, plate_id, camera_id, camera_model, direction, lane, raw_plate,
    normalized_plate, confidence, vehicle_color, vehicle_type, snapshot_url,
    event_time, raw_payload, created_at
"#;

#[derive(Clone)]
pub struct AnprRepository {
    pool: PgPool,
}

impl AnprRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_plate_id(&self, normalized: &str) -> AppResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM plates WHERE normalized = $1")
            .bind(normalized)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl AnprStore for AnprRepository {
    async fn get_or_create_plate(&self, normalized: &str, original: &str) -> AppResult<i64> {
        if let Some(id) = self.find_plate_id(normalized).await? {
            return Ok(id);
        }

        // Si otra request insertó la misma matrícula entre el SELECT y el
        // INSERT, ON CONFLICT no devuelve fila y releemos la del ganador.
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO plates (number, normalized, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (normalized) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(original)
        .bind(normalized)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(id) => Ok(id),
            None => self.find_plate_id(normalized).await?.ok_or_else(|| {
                AppError::Internal(format!("plate '{}' vanished after insert conflict", normalized))
            }),
        }
    }

    async fn create_event(&self, event: &mut NewAnprEvent) -> AppResult<()> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO anpr_events (
                plate_id, camera_id, camera_model, direction, lane, raw_plate,
                normalized_plate, confidence, vehicle_color, vehicle_type,
                snapshot_url, event_time, raw_payload, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(event.plate_id)
        .bind(&event.camera_id)
        .bind(&event.camera_model)
        .bind(&event.direction)
        .bind(event.lane)
        .bind(&event.raw_plate)
        .bind(&event.normalized_plate)
        .bind(event.confidence)
        .bind(&event.vehicle_color)
        .bind(&event.vehicle_type)
        .bind(&event.snapshot_url)
        .bind(event.event_time)
        .bind(&event.raw_payload)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        event.id = id;
        Ok(())
    }

    async fn find_lists_for_plate(&self, plate_id: i64) -> AppResult<Vec<ListHit>> {
        let hits = sqlx::query_as::<_, ListHit>(
            r#"
            SELECT lists.id AS list_id, lists.name AS list_name, lists.type AS list_type
            FROM list_items
            JOIN lists ON list_items.list_id = lists.id
            WHERE list_items.plate_id = $1
            ORDER BY lists.id
            "#,
        )
        .bind(plate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    async fn find_plates_by_normalized(&self, normalized: &str) -> AppResult<Vec<Plate>> {
        let plates = sqlx::query_as::<_, Plate>(
            "SELECT id, number, normalized, country, region, created_at FROM plates WHERE normalized = $1",
        )
        .bind(normalized)
        .fetch_all(&self.pool)
        .await?;

        Ok(plates)
    }

    async fn last_event_time_for_plate(&self, plate_id: i64) -> AppResult<Option<DateTime<Utc>>> {
        let last = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT MAX(event_time) FROM anpr_events WHERE plate_id = $1",
        )
        .bind(plate_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(last)
    }

    async fn find_events(&self, filter: &EventFilter) -> AppResult<Vec<AnprEvent>> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM anpr_events
            WHERE ($1::text IS NULL OR normalized_plate = $1)
              AND ($2::timestamptz IS NULL OR event_time >= $2)
              AND ($3::timestamptz IS NULL OR event_time <= $3)
            ORDER BY event_time DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        );

        let events = sqlx::query_as::<_, AnprEvent>(&sql)
            .bind(&filter.normalized_plate)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn delete_events_older_than(&self, days: i64) -> AppResult<u64> {
        let cutoff = retention_cutoff(days)?;

        let result = sqlx::query("DELETE FROM anpr_events WHERE event_time < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn add_plate_to_list(&self, list_name: &str, plate_id: i64, note: Option<&str>) -> AppResult<bool> {
        let list_id = sqlx::query_scalar::<_, i64>("SELECT id FROM lists WHERE name = $1")
            .bind(list_name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("list '{}'", list_name)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO list_items (list_id, plate_id, note, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (list_id, plate_id) DO NOTHING
            "#,
        )
        .bind(list_id)
        .bind(plate_id)
        .bind(note)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

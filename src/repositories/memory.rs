//! Almacén en memoria con la misma semántica que el repositorio PostgreSQL.
//!
//! Lo usan los tests del servicio y del router para ejercitar el pipeline
//! completo sin base de datos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::models::{
    AnprEvent, EventFilter, List, ListHit, ListItem, ListType, NewAnprEvent, Plate, DEFAULT_BLACKLIST,
    DEFAULT_WHITELIST,
};
use crate::repositories::AnprStore;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::retention_cutoff;

#[derive(Default)]
struct Tables {
    plates: Vec<Plate>,
    events: Vec<AnprEvent>,
    lists: Vec<List>,
    list_items: Vec<ListItem>,
}

pub struct InMemoryStore {
    tables: RwLock<Tables>,
    fail_event_writes: AtomicBool,
}

impl InMemoryStore {
    /// Store vacío con las dos listas por defecto, igual que tras la migración
    pub fn new() -> Self {
        let mut tables = Tables::default();
        for (name, list_type, description) in [
            (DEFAULT_WHITELIST, ListType::Whitelist, "Default whitelist"),
            (DEFAULT_BLACKLIST, ListType::Blacklist, "Default blacklist"),
        ] {
            let id = tables.lists.len() as i64 + 1;
            tables.lists.push(List {
                id,
                name: name.to_string(),
                list_type: list_type.to_string(),
                description: Some(description.to_string()),
                created_at: Utc::now(),
            });
        }

        Self {
            tables: RwLock::new(tables),
            fail_event_writes: AtomicBool::new(false),
        }
    }

    /// Hace fallar las inserciones de eventos como si la base de datos cayera
    pub fn fail_event_writes(&self, fail: bool) {
        self.fail_event_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn plate_count(&self) -> usize {
        self.tables.read().await.plates.len()
    }

    pub async fn event_count(&self) -> usize {
        self.tables.read().await.events.len()
    }

    pub async fn events(&self) -> Vec<AnprEvent> {
        self.tables.read().await.events.clone()
    }

    /// Inserta un evento con `event_time` arbitrario (para probar la purga)
    pub async fn insert_event_at(&self, plate_id: i64, normalized_plate: &str, event_time: DateTime<Utc>) -> i64 {
        let mut tables = self.tables.write().await;
        let id = tables.events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        tables.events.push(AnprEvent {
            id,
            plate_id: Some(plate_id),
            camera_id: "seed".to_string(),
            camera_model: None,
            direction: None,
            lane: None,
            raw_plate: normalized_plate.to_string(),
            normalized_plate: normalized_plate.to_string(),
            confidence: None,
            vehicle_color: None,
            vehicle_type: None,
            snapshot_url: None,
            event_time,
            raw_payload: None,
            created_at: Utc::now(),
        });
        id
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnprStore for InMemoryStore {
    async fn get_or_create_plate(&self, normalized: &str, original: &str) -> AppResult<i64> {
        let mut tables = self.tables.write().await;
        if let Some(plate) = tables.plates.iter().find(|p| p.normalized == normalized) {
            return Ok(plate.id);
        }

        let id = tables.plates.len() as i64 + 1;
        tables.plates.push(Plate {
            id,
            number: original.to_string(),
            normalized: normalized.to_string(),
            country: None,
            region: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn create_event(&self, event: &mut NewAnprEvent) -> AppResult<()> {
        if self.fail_event_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut tables = self.tables.write().await;
        let id = tables.events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        tables.events.push(AnprEvent {
            id,
            plate_id: Some(event.plate_id),
            camera_id: event.camera_id.clone(),
            camera_model: event.camera_model.clone(),
            direction: event.direction.clone(),
            lane: event.lane,
            raw_plate: event.raw_plate.clone(),
            normalized_plate: event.normalized_plate.clone(),
            confidence: event.confidence,
            vehicle_color: event.vehicle_color.clone(),
            vehicle_type: event.vehicle_type.clone(),
            snapshot_url: event.snapshot_url.clone(),
            event_time: event.event_time,
            raw_payload: event.raw_payload.clone(),
            created_at: Utc::now(),
        });

        event.id = id;
        Ok(())
    }

    async fn find_lists_for_plate(&self, plate_id: i64) -> AppResult<Vec<ListHit>> {
        let tables = self.tables.read().await;
        let mut hits: Vec<ListHit> = tables
            .list_items
            .iter()
            .filter(|item| item.plate_id == plate_id)
            .filter_map(|item| tables.lists.iter().find(|l| l.id == item.list_id))
            .map(|list| ListHit {
                list_id: list.id,
                list_name: list.name.clone(),
                list_type: list.list_type.clone(),
            })
            .collect();
        hits.sort_by_key(|h| h.list_id);
        Ok(hits)
    }

    async fn find_plates_by_normalized(&self, normalized: &str) -> AppResult<Vec<Plate>> {
        let tables = self.tables.read().await;
        Ok(tables
            .plates
            .iter()
            .filter(|p| p.normalized == normalized)
            .cloned()
            .collect())
    }

    async fn last_event_time_for_plate(&self, plate_id: i64) -> AppResult<Option<DateTime<Utc>>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| e.plate_id == Some(plate_id))
            .map(|e| e.event_time)
            .max())
    }

    async fn find_events(&self, filter: &EventFilter) -> AppResult<Vec<AnprEvent>> {
        let tables = self.tables.read().await;
        let mut events: Vec<AnprEvent> = tables
            .events
            .iter()
            .filter(|e| {
                filter
                    .normalized_plate
                    .as_ref()
                    .map_or(true, |p| &e.normalized_plate == p)
            })
            .filter(|e| filter.from.map_or(true, |from| e.event_time >= from))
            .filter(|e| filter.to.map_or(true, |to| e.event_time <= to))
            .cloned()
            .collect();

        events.sort_by(|a, b| b.event_time.cmp(&a.event_time).then(b.id.cmp(&a.id)));

        Ok(events
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn delete_events_older_than(&self, days: i64) -> AppResult<u64> {
        let cutoff = retention_cutoff(days)?;
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables.events.retain(|e| e.event_time >= cutoff);
        Ok((before - tables.events.len()) as u64)
    }

    async fn add_plate_to_list(&self, list_name: &str, plate_id: i64, note: Option<&str>) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let list_id = tables
            .lists
            .iter()
            .find(|l| l.name == list_name)
            .map(|l| l.id)
            .ok_or_else(|| AppError::NotFound(format!("list '{}'", list_name)))?;

        if tables
            .list_items
            .iter()
            .any(|item| item.list_id == list_id && item.plate_id == plate_id)
        {
            return Ok(false);
        }

        tables.list_items.push(ListItem {
            list_id,
            plate_id,
            note: note.map(str::to_string),
            created_at: Utc::now(),
        });
        Ok(true)
    }
}

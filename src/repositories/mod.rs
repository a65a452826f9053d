//! Repositorios
//!
//! `AnprStore` es la frontera entre el pipeline de ingesta y el almacén.
//! `AnprRepository` la implementa sobre PostgreSQL; `InMemoryStore` la
//! implementa en memoria para tests.

pub mod anpr_repository;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AnprEvent, EventFilter, ListHit, NewAnprEvent, Plate};
use crate::utils::errors::AppResult;

pub use anpr_repository::AnprRepository;
pub use memory::InMemoryStore;

#[async_trait]
pub trait AnprStore: Send + Sync {
    /// Busca la matrícula por clave normalizada y la crea si no existe.
    async fn get_or_create_plate(&self, normalized: &str, original: &str) -> AppResult<i64>;

    /// Inserta el evento y escribe el id generado en `event.id`.
    async fn create_event(&self, event: &mut NewAnprEvent) -> AppResult<()>;

    async fn find_lists_for_plate(&self, plate_id: i64) -> AppResult<Vec<ListHit>>;

    async fn find_plates_by_normalized(&self, normalized: &str) -> AppResult<Vec<Plate>>;

    async fn last_event_time_for_plate(&self, plate_id: i64) -> AppResult<Option<DateTime<Utc>>>;

    async fn find_events(&self, filter: &EventFilter) -> AppResult<Vec<AnprEvent>>;

    /// Borra eventos con `event_time` anterior a `now - days`; devuelve cuántos.
    async fn delete_events_older_than(&self, days: i64) -> AppResult<u64>;

    /// Añade la matrícula a la lista. `Ok(false)` si ya era miembro.
    async fn add_plate_to_list(&self, list_name: &str, plate_id: i64, note: Option<&str>) -> AppResult<bool>;
}

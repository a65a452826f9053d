//! Modelo de eventos ANPR
//!
//! `EventPayload` es la forma común que producen los dos webhooks (JSON y
//! Hikvision). `NewAnprEvent` es la fila a insertar y `AnprEvent` la fila
//! leída de `anpr_events`.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::models::list::ListHit;
use crate::utils::validation::non_empty;

/// Datos del vehículo que algunas cámaras adjuntan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

/// Payload entrante de una cámara
///
/// Todos los campos son opcionales a nivel de deserialización: la validación
/// de los obligatorios (plate, camera_id, event_time) la hace el servicio
/// para que el cliente reciba un 400 con el campo concreto.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub camera_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub lane: Option<i32>,
    #[serde(default)]
    pub event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: VehicleInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<Map<String, Value>>,
}

/// Evento listo para insertar
///
/// `id` vale 0 hasta que el repositorio lo inserta y escribe el id generado.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnprEvent {
    pub id: i64,
    pub plate_id: i64,
    pub camera_id: String,
    pub camera_model: Option<String>,
    pub direction: Option<String>,
    pub lane: Option<i32>,
    pub raw_plate: String,
    pub normalized_plate: String,
    pub confidence: Option<Decimal>,
    pub vehicle_color: Option<String>,
    pub vehicle_type: Option<String>,
    pub snapshot_url: Option<String>,
    pub event_time: DateTime<Utc>,
    pub raw_payload: Option<Value>,
}

impl NewAnprEvent {
    /// Construye la fila a partir del payload ya validado.
    ///
    /// Los strings vacíos, la confianza 0, el carril 0 y el payload crudo
    /// vacío se guardan como NULL.
    pub fn from_payload(
        plate_id: i64,
        normalized_plate: String,
        event_time: DateTime<Utc>,
        camera_model: Option<String>,
        payload: EventPayload,
    ) -> Self {
        let confidence = payload
            .confidence
            .filter(|c| *c != 0.0 && c.is_finite())
            .and_then(Decimal::from_f64)
            .map(|c| c.round_dp(2));

        Self {
            id: 0,
            plate_id,
            camera_id: payload.camera_id.trim().to_string(),
            camera_model: non_empty(camera_model),
            direction: non_empty(payload.direction),
            lane: payload.lane.filter(|l| *l != 0),
            raw_plate: payload.plate,
            normalized_plate,
            confidence,
            vehicle_color: non_empty(payload.vehicle.color),
            vehicle_type: non_empty(payload.vehicle.vehicle_type),
            snapshot_url: non_empty(payload.snapshot_url),
            event_time,
            raw_payload: payload
                .raw_payload
                .filter(|map| !map.is_empty())
                .map(Value::Object),
        }
    }
}

/// AnprEvent - mapea exactamente a la tabla anpr_events
#[derive(Debug, Clone, FromRow)]
pub struct AnprEvent {
    pub id: i64,
    pub plate_id: Option<i64>,
    pub camera_id: String,
    pub camera_model: Option<String>,
    pub direction: Option<String>,
    pub lane: Option<i32>,
    pub raw_plate: String,
    pub normalized_plate: String,
    pub confidence: Option<Decimal>,
    pub vehicle_color: Option<String>,
    pub vehicle_type: Option<String>,
    pub snapshot_url: Option<String>,
    pub event_time: DateTime<Utc>,
    pub raw_payload: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Response de evento para listados
#[derive(Debug, Clone, Serialize)]
pub struct EventInfo {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_id: Option<i64>,
    pub camera_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<i32>,
    pub raw_plate: String,
    pub normalized_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_url: Option<String>,
    pub event_time: DateTime<Utc>,
}

impl From<AnprEvent> for EventInfo {
    fn from(event: AnprEvent) -> Self {
        Self {
            id: event.id,
            plate_id: event.plate_id,
            camera_id: event.camera_id,
            camera_model: event.camera_model,
            direction: event.direction,
            lane: event.lane,
            raw_plate: event.raw_plate,
            normalized_plate: event.normalized_plate,
            confidence: event.confidence.and_then(|c| c.to_f64()),
            vehicle_color: event.vehicle_color,
            vehicle_type: event.vehicle_type,
            snapshot_url: event.snapshot_url,
            event_time: event.event_time,
        }
    }
}

/// Filtros para búsqueda de eventos (ya normalizados y acotados)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub normalized_plate: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

/// Resultado de procesar un evento entrante
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub event_id: i64,
    pub plate_id: i64,
    pub plate: String,
    pub hits: Vec<ListHit>,
}

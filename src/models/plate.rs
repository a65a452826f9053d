//! Modelo de Plate
//!
//! Mapea la tabla `plates`: una fila por matrícula normalizada.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Plate principal - mapea exactamente a la tabla plates
#[derive(Debug, Clone, FromRow)]
pub struct Plate {
    pub id: i64,
    /// Texto tal como lo leyó la primera cámara que vio la matrícula
    pub number: String,
    pub normalized: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response de matrícula con la última vez que fue vista
#[derive(Debug, Clone, Serialize)]
pub struct PlateInfo {
    pub id: i64,
    pub number: String,
    pub normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event_time: Option<DateTime<Utc>>,
}

impl PlateInfo {
    pub fn new(plate: Plate, last_event_time: Option<DateTime<Utc>>) -> Self {
        Self {
            id: plate.id,
            number: plate.number,
            normalized: plate.normalized,
            last_event_time,
        }
    }
}

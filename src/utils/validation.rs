//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de parámetros
//! de consulta y conversión de tipos.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use validator::ValidationError;

use crate::utils::errors::{invalid_input, AppResult};

/// Límite por defecto para listados de eventos
pub const DEFAULT_EVENTS_LIMIT: i64 = 50;
/// Límite máximo para listados de eventos
pub const MAX_EVENTS_LIMIT: i64 = 100;

/// Validar y convertir string RFC3339 a datetime
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Instante de corte de la purga: `now - days`.
///
/// Falla con entrada inválida si el resultado queda fuera del rango de fechas.
pub fn retention_cutoff(days: i64) -> AppResult<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|delta| Utc::now().checked_sub_signed(delta))
        .ok_or_else(|| invalid_input("retention days out of range"))
}

/// Acotar el límite de paginación a 1..=100 (50 si no es positivo)
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(l) if l > 0 => l.min(MAX_EVENTS_LIMIT),
        _ => DEFAULT_EVENTS_LIMIT,
    }
}

/// Offset negativo o ausente se convierte en 0
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.filter(|o| *o >= 0).unwrap_or(0)
}

/// Parseo tolerante de fechas de cámara: RFC3339 (con o sin fracción)
/// o formatos sin zona horaria, que se toman como UTC.
pub fn parse_camera_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|naive| naive.and_utc())
}

/// Convierte strings vacíos (o solo espacios) en None
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

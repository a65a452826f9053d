use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::ListHit;
use crate::services::anpr_service::EventQuery;

// Query de /api/v1/plates
#[derive(Debug, Default, Deserialize)]
pub struct PlatesQuery {
    pub plate: Option<String>,
}

// Query de /api/v1/events
//
// limit y offset llegan como texto: un valor no numérico se ignora en vez
// de rechazar la petición.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub plate: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl From<EventsQuery> for EventQuery {
    fn from(query: EventsQuery) -> Self {
        Self {
            plate: query.plate,
            from: query.from,
            to: query.to,
            limit: parse_lenient(query.limit),
            offset: parse_lenient(query.offset),
        }
    }
}

fn parse_lenient(value: Option<String>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

// Query opcional del webhook Hikvision
#[derive(Debug, Default, Deserialize)]
pub struct HikvisionQuery {
    pub camera_id: Option<String>,
}

// Request para añadir un vehículo a la whitelist
#[derive(Debug, Deserialize, Validate)]
pub struct SyncVehicleRequest {
    #[validate(length(min = 1, message = "plate_number is required"))]
    #[serde(default)]
    pub plate_number: String,
}

// Response de un evento procesado (201)
#[derive(Debug, Serialize)]
pub struct ProcessEventResponse {
    pub status: &'static str,
    pub event_id: i64,
    pub plate_id: i64,
    pub plate: String,
    pub hits: Vec<ListHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<bool>,
}

// Response de sync-vehicle
#[derive(Debug, Serialize)]
pub struct SyncVehicleResponse {
    pub status: &'static str,
    pub plate_id: i64,
    pub plate_number: String,
    pub message: &'static str,
}

// Envoltorio `{ "data": ... }` de los listados
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

// Estado de la cámara configurada
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CameraStatus {
    pub camera_model: String,
    pub http_host: String,
    pub rtsp_url: String,
    pub configured: bool,
    pub http_accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_error: Option<String>,
    pub rtsp_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct CameraStatusResponse {
    pub status: CameraStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_query_parses_numbers_leniently() {
        let query: EventQuery = EventsQuery {
            limit: Some("abc".to_string()),
            offset: Some(" 20 ".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(query.limit, None);
        assert_eq!(query.offset, Some(20));
    }

    #[test]
    fn test_sync_request_requires_plate_number() {
        let empty = SyncVehicleRequest {
            plate_number: String::new(),
        };
        assert!(empty.validate().is_err());

        let ok = SyncVehicleRequest {
            plate_number: "AB123CD".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_process_response_omits_processed_flag_for_json_webhook() {
        let body = serde_json::to_value(ProcessEventResponse {
            status: "ok",
            event_id: 1,
            plate_id: 2,
            plate: "AB123CD".to_string(),
            hits: vec![],
            processed: None,
        })
        .unwrap();
        assert!(body.get("processed").is_none());
        assert_eq!(body["hits"], serde_json::json!([]));
    }
}

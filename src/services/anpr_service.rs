//! Servicio de ingesta ANPR
//!
//! Pipeline lineal: validar → normalizar → obtener/crear matrícula →
//! guardar evento → buscar coincidencias en listas. Cada paso corta el
//! flujo si falla; no hay reintentos.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::CameraConfig;
use crate::models::{EventFilter, EventInfo, EventPayload, NewAnprEvent, PlateInfo, ProcessResult, DEFAULT_WHITELIST};
use crate::repositories::AnprStore;
use crate::utils::errors::{invalid_input, AppResult};
use crate::utils::normalize_plate;
use crate::utils::validation::{clamp_limit, clamp_offset, validate_datetime};

/// Parámetros crudos de búsqueda de eventos, tal como llegan por query string
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub plate: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Clone)]
pub struct AnprService {
    store: Arc<dyn AnprStore>,
}

impl AnprService {
    pub fn new(store: Arc<dyn AnprStore>) -> Self {
        Self { store }
    }

    /// Procesa un evento entrante de cualquiera de los dos webhooks
    pub async fn process_incoming_event(&self, payload: EventPayload, camera: &CameraConfig) -> AppResult<ProcessResult> {
        if payload.plate.trim().is_empty() {
            return Err(invalid_input("plate is required"));
        }
        if payload.camera_id.trim().is_empty() {
            return Err(invalid_input("camera_id is required"));
        }
        let event_time = payload
            .event_time
            .ok_or_else(|| invalid_input("event_time is required"))?;

        let normalized = normalize_plate(&payload.plate);
        if normalized.is_empty() {
            return Err(invalid_input("plate cannot be empty after normalization"));
        }

        let plate_id = self
            .store
            .get_or_create_plate(&normalized, &payload.plate)
            .await
            .map_err(|e| {
                error!(error = %e, plate = %normalized, "failed to get or create plate");
                e
            })?;

        let camera_model = payload
            .camera_model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| Some(camera.model.clone()));

        let raw_plate = payload.plate.clone();
        let mut event = NewAnprEvent::from_payload(plate_id, normalized.clone(), event_time, camera_model, payload);

        self.store.create_event(&mut event).await.map_err(|e| {
            error!(
                error = %e,
                plate = %normalized,
                camera_id = %event.camera_id,
                "failed to create ANPR event"
            );
            e
        })?;

        info!(
            event_id = event.id,
            plate_id,
            plate = %normalized,
            raw_plate = %raw_plate,
            camera_id = %event.camera_id,
            event_time = %event_time.to_rfc3339(),
            "saved ANPR event to database"
        );

        let hits = self.store.find_lists_for_plate(plate_id).await.map_err(|e| {
            error!(error = %e, plate_id, "failed to find lists for plate");
            e
        })?;

        if hits.is_empty() {
            debug!(plate_id, plate = %normalized, "plate not found in any lists");
        } else {
            info!(plate_id, plate = %normalized, hits_count = hits.len(), "plate found in lists");
            for hit in &hits {
                debug!(
                    list_id = hit.list_id,
                    list_name = %hit.list_name,
                    list_type = %hit.list_type,
                    "list hit"
                );
            }
        }

        Ok(ProcessResult {
            event_id: event.id,
            plate_id,
            plate: normalized,
            hits,
        })
    }

    /// Matrículas cuyo valor normalizado coincide, con su último avistamiento
    pub async fn find_plates(&self, plate_query: &str) -> AppResult<Vec<PlateInfo>> {
        let normalized = normalize_plate(plate_query);
        if normalized.is_empty() {
            return Err(invalid_input("plate query cannot be empty"));
        }

        let plates = self.store.find_plates_by_normalized(&normalized).await?;

        let mut result = Vec::with_capacity(plates.len());
        for plate in plates {
            let last_event_time = self.store.last_event_time_for_plate(plate.id).await?;
            result.push(PlateInfo::new(plate, last_event_time));
        }

        Ok(result)
    }

    /// Listado paginado de eventos, más recientes primero
    pub async fn find_events(&self, query: EventQuery) -> AppResult<Vec<EventInfo>> {
        let filter = build_event_filter(query)?;
        let events = self.store.find_events(&filter).await?;
        Ok(events.into_iter().map(EventInfo::from).collect())
    }

    /// Purga de eventos con más de `days` días
    pub async fn cleanup_old_events(&self, days: i64) -> AppResult<u64> {
        if days <= 0 {
            return Err(invalid_input("retention days must be positive"));
        }

        let deleted = self.store.delete_events_older_than(days).await.map_err(|e| {
            error!(error = %e, days, "failed to cleanup old events");
            e
        })?;

        if deleted > 0 {
            info!(deleted_count = deleted, days, "cleaned up old events");
        }
        Ok(deleted)
    }

    /// Registra la matrícula (si no existe) y la añade a la whitelist por defecto
    pub async fn sync_vehicle_to_whitelist(&self, plate_number: &str) -> AppResult<i64> {
        let normalized = normalize_plate(plate_number);
        if normalized.is_empty() {
            return Err(invalid_input("plate_number cannot be empty after normalization"));
        }

        let plate_id = self.store.get_or_create_plate(&normalized, plate_number.trim()).await?;
        let added = self
            .store
            .add_plate_to_list(DEFAULT_WHITELIST, plate_id, Some("synced vehicle"))
            .await?;

        if added {
            info!(plate_id, plate = %normalized, "plate added to whitelist");
        } else {
            debug!(plate_id, plate = %normalized, "plate already in whitelist");
        }

        Ok(plate_id)
    }
}

/// Normaliza y acota los parámetros de búsqueda
pub fn build_event_filter(query: EventQuery) -> AppResult<EventFilter> {
    let normalized_plate = query
        .plate
        .as_deref()
        .map(normalize_plate)
        .filter(|p| !p.is_empty());

    let from = match query.from.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(validate_datetime(raw).map_err(|_| invalid_input("invalid from time format"))?),
        None => None,
    };
    let to = match query.to.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(validate_datetime(raw).map_err(|_| invalid_input("invalid to time format"))?),
        None => None,
    };

    Ok(EventFilter {
        normalized_plate,
        from,
        to,
        limit: clamp_limit(query.limit),
        offset: clamp_offset(query.offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListType, DEFAULT_BLACKLIST};
    use crate::repositories::InMemoryStore;
    use crate::utils::errors::AppError;
    use chrono::{Duration, TimeZone, Utc};

    fn camera() -> CameraConfig {
        CameraConfig {
            model: "hikvision-ds-2cd".to_string(),
            http_host: "http://192.168.1.64".to_string(),
            rtsp_url: String::new(),
        }
    }

    fn payload(plate: &str) -> EventPayload {
        EventPayload {
            camera_id: "cam1".to_string(),
            plate: plate.to_string(),
            event_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn service() -> (Arc<InMemoryStore>, AnprService) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), AnprService::new(store))
    }

    #[tokio::test]
    async fn test_new_plate_creates_plate_and_event() {
        let (store, service) = service();

        let result = service.process_incoming_event(payload("AB 123 CD"), &camera()).await.unwrap();

        assert_eq!(result.plate, "AB123CD");
        assert!(result.hits.is_empty());
        assert!(result.event_id > 0);
        assert_eq!(store.plate_count().await, 1);
        assert_eq!(store.event_count().await, 1);

        let saved = &store.events().await[0];
        assert_eq!(saved.id, result.event_id);
        assert_eq!(saved.plate_id, Some(result.plate_id));
        assert_eq!(saved.raw_plate, "AB 123 CD");
    }

    #[tokio::test]
    async fn test_same_plate_different_spelling_reuses_plate() {
        let (store, service) = service();

        let first = service.process_incoming_event(payload("AB 123 CD"), &camera()).await.unwrap();
        let second = service.process_incoming_event(payload("ab-123-cd"), &camera()).await.unwrap();

        assert_eq!(first.plate_id, second.plate_id);
        assert_ne!(first.event_id, second.event_id);
        assert_eq!(store.plate_count().await, 1);
        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn test_missing_required_fields_are_invalid_input() {
        let (store, service) = service();

        let mut no_plate = payload("");
        no_plate.plate = "   ".to_string();
        let mut no_camera = payload("AB123CD");
        no_camera.camera_id = String::new();
        let mut no_time = payload("AB123CD");
        no_time.event_time = None;

        for (p, field) in [(no_plate, "plate"), (no_camera, "camera_id"), (no_time, "event_time")] {
            match service.process_incoming_event(p, &camera()).await {
                Err(AppError::InvalidInput(msg)) => assert!(msg.contains(field), "{}", msg),
                other => panic!("expected invalid input for {}, got {:?}", field, other.map(|r| r.event_id)),
            }
        }
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn test_plate_with_only_punctuation_is_rejected() {
        let (store, service) = service();
        let err = service.process_incoming_event(payload("-- ."), &camera()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(store.plate_count().await, 0);
    }

    #[tokio::test]
    async fn test_camera_model_defaults_from_config() {
        let (store, service) = service();

        service.process_incoming_event(payload("X1"), &camera()).await.unwrap();
        let mut with_model = payload("X2");
        with_model.camera_model = Some("axis-p1445".to_string());
        service.process_incoming_event(with_model, &camera()).await.unwrap();

        let events = store.events().await;
        assert_eq!(events[0].camera_model.as_deref(), Some("hikvision-ds-2cd"));
        assert_eq!(events[1].camera_model.as_deref(), Some("axis-p1445"));
    }

    #[tokio::test]
    async fn test_listed_plate_reports_hits() {
        let (store, service) = service();
        let plate_id = store.get_or_create_plate("AB123CD", "AB123CD").await.unwrap();
        store.add_plate_to_list(DEFAULT_BLACKLIST, plate_id, None).await.unwrap();

        let result = service.process_incoming_event(payload("ab 123 cd"), &camera()).await.unwrap();

        assert_eq!(result.plate_id, plate_id);
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].list_name, DEFAULT_BLACKLIST);
        assert_eq!(result.hits[0].kind(), Some(ListType::Blacklist));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_pipeline() {
        let (store, service) = service();
        store.fail_event_writes(true);

        let err = service.process_incoming_event(payload("AB123CD"), &camera()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn test_find_plates_includes_last_event_time() {
        let (store, service) = service();
        let seen_at = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let plate_id = store.get_or_create_plate("AB123CD", "AB 123 CD").await.unwrap();
        store.insert_event_at(plate_id, "AB123CD", seen_at - Duration::days(1)).await;
        store.insert_event_at(plate_id, "AB123CD", seen_at).await;
        store.get_or_create_plate("ZZ999", "ZZ 999").await.unwrap();

        let plates = service.find_plates("ab 123 cd").await.unwrap();
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].number, "AB 123 CD");
        assert_eq!(plates[0].last_event_time, Some(seen_at));

        let unseen = service.find_plates("ZZ999").await.unwrap();
        assert_eq!(unseen[0].last_event_time, None);

        assert!(matches!(service.find_plates(" - ").await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_find_events_filters_and_orders() {
        let (store, service) = service();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let a = store.get_or_create_plate("AAA111", "AAA111").await.unwrap();
        let b = store.get_or_create_plate("BBB222", "BBB222").await.unwrap();
        for day in 0..5 {
            store.insert_event_at(a, "AAA111", base + Duration::days(day)).await;
        }
        store.insert_event_at(b, "BBB222", base).await;

        let events = service
            .find_events(EventQuery {
                plate: Some("aaa 111".to_string()),
                from: Some("2024-05-02T00:00:00Z".to_string()),
                to: Some("2024-05-04T00:00:00Z".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let times: Vec<_> = events.iter().map(|e| e.event_time).collect();
        assert_eq!(
            times,
            vec![base + Duration::days(3), base + Duration::days(2), base + Duration::days(1)]
        );

        let all = service.find_events(EventQuery::default()).await.unwrap();
        assert_eq!(all.len(), 6);
    }

    #[tokio::test]
    async fn test_find_events_rejects_bad_time_bounds() {
        let (_, service) = service();
        let err = service
            .find_events(EventQuery {
                from: Some("01/05/2024".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg.contains("from")));
    }

    #[tokio::test]
    async fn test_find_events_limit_is_clamped() {
        let (store, service) = service();
        let plate_id = store.get_or_create_plate("AAA111", "AAA111").await.unwrap();
        let now = Utc::now();
        for i in 0..120 {
            store.insert_event_at(plate_id, "AAA111", now - Duration::minutes(i)).await;
        }

        let events = service
            .find_events(EventQuery {
                limit: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(events.len(), 100);

        let page = service
            .find_events(EventQuery {
                limit: Some(10),
                offset: Some(115),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 5);
    }

    #[test]
    fn test_blank_plate_filter_is_ignored() {
        let filter = build_event_filter(EventQuery {
            plate: Some(" - ".to_string()),
            limit: Some(0),
            offset: Some(-5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.normalized_plate, None);
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_old_events() {
        let (store, service) = service();
        let plate_id = store.get_or_create_plate("AAA111", "AAA111").await.unwrap();
        let now = Utc::now();
        store.insert_event_at(plate_id, "AAA111", now - Duration::days(40)).await;
        store.insert_event_at(plate_id, "AAA111", now - Duration::days(31)).await;
        store.insert_event_at(plate_id, "AAA111", now - Duration::days(2)).await;

        let deleted = service.cleanup_old_events(30).await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.event_count().await, 1);
        assert!(matches!(service.cleanup_old_events(0).await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_cleanup_with_huge_retention_is_rejected() {
        let (store, service) = service();
        let plate_id = store.get_or_create_plate("AAA111", "AAA111").await.unwrap();
        store.insert_event_at(plate_id, "AAA111", Utc::now()).await;

        let err = service.cleanup_old_events(100_000_000).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(msg) if msg.contains("out of range")));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn test_sync_vehicle_adds_plate_to_whitelist_once() {
        let (store, service) = service();

        let first = service.sync_vehicle_to_whitelist("А 777 МР").await.unwrap();
        let second = service.sync_vehicle_to_whitelist("a777mp").await.unwrap();
        assert_eq!(first, second);

        let hits = store.find_lists_for_plate(first).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].list_name, DEFAULT_WHITELIST);

        let result = service.process_incoming_event(payload("A777MP"), &camera()).await.unwrap();
        assert_eq!(result.plate_id, first);
        assert_eq!(result.hits[0].kind(), Some(ListType::Whitelist));
    }
}

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::dto::{
    CameraStatusResponse, DataResponse, EventsQuery, HealthResponse, HikvisionQuery, PlatesQuery,
    ProcessEventResponse, SyncVehicleRequest, SyncVehicleResponse,
};
use crate::hikvision::{extract_xml_payload, multipart::INVALID_MULTIPART, parse_alert};
use crate::middleware::require_bearer;
use crate::models::{EventInfo, EventPayload, PlateInfo, ProcessResult};
use crate::services::check_camera_status;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError, AppResult};

/// Límite del cuerpo multipart de Hikvision (XML + imágenes)
pub const HIKVISION_BODY_LIMIT: usize = 10 * 1024 * 1024;

const XML_PREVIEW_LEN: usize = 200;

pub fn create_anpr_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/anpr/sync-vehicle", post(sync_vehicle))
        .route_layer(middleware::from_fn_with_state(state, require_bearer));

    Router::new()
        .route("/anpr/events", post(create_event))
        .route(
            "/anpr/hikvision",
            post(create_hikvision_event).layer(DefaultBodyLimit::max(HIKVISION_BODY_LIMIT)),
        )
        .route("/plates", get(list_plates))
        .route("/events", get(list_events))
        .route("/camera/status", get(camera_status))
        .merge(protected)
}

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

fn created(result: ProcessResult, processed: Option<bool>) -> (StatusCode, Json<ProcessEventResponse>) {
    (
        StatusCode::CREATED,
        Json(ProcessEventResponse {
            status: "ok",
            event_id: result.event_id,
            plate_id: result.plate_id,
            plate: result.plate,
            hits: result.hits,
            processed,
        }),
    )
}

async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProcessEventResponse>)> {
    let Json(mut payload) = payload.map_err(|e| bad_request_error(&e.body_text()))?;

    if payload.event_time.is_none() {
        payload.event_time = Some(Utc::now());
    }

    let result = state
        .anpr_service
        .process_incoming_event(payload, &state.config.camera)
        .await?;

    Ok(created(result, None))
}

async fn create_hikvision_event(
    State(state): State<AppState>,
    Query(query): Query<HikvisionQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<ProcessEventResponse>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    info!(content_type = %content_type, user_agent = %user_agent, "📥 received Hikvision event request");

    let multipart = multipart.map_err(|e| {
        error!(error = %e, "failed to parse multipart request");
        bad_request_error(INVALID_MULTIPART)
    })?;

    let xml = extract_xml_payload(multipart).await?;
    debug!(
        xml_size = xml.len(),
        xml_preview = %xml.chars().take(XML_PREVIEW_LEN).collect::<String>(),
        "extracted XML payload"
    );

    let alert = parse_alert(&xml).map_err(|e| {
        error!(error = %e, xml_content = %xml, "failed to parse hikvision xml");
        bad_request_error("invalid xml payload")
    })?;

    info!(
        event_type = %alert.event_type,
        license_plate = %alert.anpr.license_plate,
        device_id = %alert.device_id,
        channel_id = %alert.channel_id,
        date_time = %alert.date_time,
        "parsed Hikvision event"
    );

    let mut payload = alert.to_event_payload(&xml);
    if payload.camera_id.is_empty() {
        payload.camera_id = query
            .camera_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| state.config.camera.http_host.clone());
    }
    if payload.camera_model.is_none() {
        payload.camera_model = Some(state.config.camera.model.clone());
    }
    if payload.event_time.is_none() {
        payload.event_time = Some(Utc::now());
    }

    let plate = payload.plate.clone();
    let camera_id = payload.camera_id.clone();
    let result = state
        .anpr_service
        .process_incoming_event(payload, &state.config.camera)
        .await
        .map_err(|e| {
            if matches!(e, AppError::InvalidInput(_)) {
                warn!(error = %e, plate = %plate, camera_id = %camera_id, "invalid input for Hikvision event");
            }
            e
        })?;

    info!(
        event_id = result.event_id,
        plate_id = result.plate_id,
        plate = %result.plate,
        hits_count = result.hits.len(),
        "✅ successfully processed and saved Hikvision event"
    );

    Ok(created(result, Some(true)))
}

async fn list_plates(
    State(state): State<AppState>,
    Query(query): Query<PlatesQuery>,
) -> AppResult<Json<DataResponse<Vec<PlateInfo>>>> {
    let plate = query
        .plate
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| bad_request_error("plate parameter is required"))?;

    let data = state.anpr_service.find_plates(plate).await?;
    Ok(Json(DataResponse { data }))
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Json<DataResponse<Vec<EventInfo>>>> {
    let data = state.anpr_service.find_events(query.into()).await?;
    Ok(Json(DataResponse { data }))
}

async fn camera_status(State(state): State<AppState>) -> Json<CameraStatusResponse> {
    let status = check_camera_status(&state.http_client, &state.config.camera).await;
    Json(CameraStatusResponse { status })
}

async fn sync_vehicle(
    State(state): State<AppState>,
    request: Result<Json<SyncVehicleRequest>, JsonRejection>,
) -> AppResult<Json<SyncVehicleResponse>> {
    let Json(request) = request.map_err(|e| bad_request_error(&e.body_text()))?;
    request.validate()?;

    let plate_id = state
        .anpr_service
        .sync_vehicle_to_whitelist(&request.plate_number)
        .await
        .map_err(|e| {
            error!(error = %e, plate_number = %request.plate_number, "failed to sync vehicle to whitelist");
            e
        })?;

    info!(plate_number = %request.plate_number, plate_id, "🚗 vehicle synced to whitelist");

    Ok(Json(SyncVehicleResponse {
        status: "ok",
        plate_id,
        plate_number: request.plate_number,
        message: "vehicle added to whitelist",
    }))
}

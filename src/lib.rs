//! ANPR backend
//!
//! Ingesta de eventos de cámaras de lectura de matrículas (JSON genérico y
//! webhook Hikvision), almacenamiento en PostgreSQL y consulta de
//! matrículas, eventos y coincidencias en whitelist/blacklist.

pub mod config;
pub mod database;
pub mod dto;
pub mod hikvision;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::routes::{create_anpr_router, create_health_router};
use crate::state::AppState;

/// Router completo de la API con su estado
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(create_health_router())
        .nest("/api/v1", create_anpr_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

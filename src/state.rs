//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todo es inmutable tras el arranque.

use reqwest::Client;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::AnprStore;
use crate::services::AnprService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub anpr_service: Arc<AnprService>,
    pub http_client: Client,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, store: Arc<dyn AnprStore>) -> Self {
        Self {
            config: Arc::new(config),
            anpr_service: Arc::new(AnprService::new(store)),
            http_client: Client::new(),
        }
    }
}

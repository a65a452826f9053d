//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todo tiene valor por defecto salvo `DATABASE_URL`.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::config::database::DatabaseConfig;

/// Cámara ANPR configurada para este despliegue
#[derive(Debug, Clone, Default)]
pub struct CameraConfig {
    /// Modelo que se asigna a los eventos que no traen `camera_model`
    pub model: String,
    /// Interfaz HTTP de la cámara (también camera_id por defecto en Hikvision)
    pub http_host: String,
    pub rtsp_url: String,
}

impl CameraConfig {
    pub fn is_configured(&self) -> bool {
        !self.http_host.is_empty() && !self.rtsp_url.is_empty()
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub camera: CameraConfig,
    /// Si está definido, al arrancar se purgan los eventos más antiguos
    pub event_retention_days: Option<i64>,
}

impl EnvironmentConfig {
    /// Leer configuración desde el entorno (tras `dotenvy::dotenv()`)
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", 2)?,
            ..DatabaseConfig::default()
        };

        let event_retention_days = match env::var("EVENT_RETENTION_DAYS") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<i64>()
                    .context("EVENT_RETENTION_DAYS must be a valid number")?,
            ),
            _ => None,
        };

        Ok(Self {
            environment: var_or("ENVIRONMENT", "development"),
            port: parse_var("PORT", 8080)?,
            host: var_or("HOST", "0.0.0.0"),
            database,
            jwt_secret: var_or("JWT_SECRET", "change-me-in-production"),
            cors_origins: split_list(&var_or("CORS_ORIGINS", "")),
            camera: CameraConfig {
                model: var_or("CAMERA_MODEL", "hikvision"),
                http_host: var_or("CAMERA_HTTP_HOST", ""),
                rtsp_url: var_or("CAMERA_RTSP_URL", ""),
            },
            event_retention_days,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        _ => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

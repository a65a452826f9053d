//! Configuración de conexión a PostgreSQL
//!
//! Este módulo abre el pool y deja el schema listo antes de servir requests.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::migrations::run_migrations;
use crate::utils::masking::mask_database_url;

/// Conexión a la base de datos con el schema migrado
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar y aplicar las migraciones idempotentes
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("🗄️ Conectando a {}", mask_database_url(&config.url));

        let pool = config
            .create_pool()
            .await
            .context("failed to connect to database")?;

        run_migrations(&pool).await.context("failed to run migrations")?;
        info!("✅ Schema de base de datos verificado");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

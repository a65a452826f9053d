use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use anpr_backend::build_router;
use anpr_backend::config::EnvironmentConfig;
use anpr_backend::database::DatabaseConnection;
use anpr_backend::repositories::AnprRepository;
use anpr_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("📷 ANPR backend");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!(environment = %config.environment, "⚙️ Configuración cargada");
    if !config.is_development() && config.jwt_secret == "change-me-in-production" {
        warn!("⚠️ JWT_SECRET por defecto, no usar en producción");
    }

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::connect(&config.database).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };
    let repository = AnprRepository::new(db_connection.pool().clone());

    let addr: SocketAddr = config.server_url().parse()?;
    let retention_days = config.event_retention_days;
    let app_state = AppState::new(config, Arc::new(repository));

    // Purga única al arrancar
    if let Some(days) = retention_days {
        match app_state.anpr_service.cleanup_old_events(days).await {
            Ok(deleted) => info!("🧹 Purga inicial: {} eventos con más de {} días", deleted, days),
            Err(e) => error!("❌ Error en la purga inicial: {}", e),
        }
    }

    let app = build_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/v1/anpr/events - Evento ANPR (JSON)");
    info!("   POST /api/v1/anpr/hikvision - Webhook Hikvision (multipart XML)");
    info!("   GET  /api/v1/plates?plate= - Buscar matrícula");
    info!("   GET  /api/v1/events - Listar eventos");
    info!("   GET  /api/v1/camera/status - Estado de la cámara");
    info!("   POST /api/v1/anpr/sync-vehicle - Añadir a whitelist (bearer)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
